//! Book repository for catalog and inventory database operations.
//!
//! Catalog CRUD runs against the pooled connection. The inventory pair
//! `lock_for_update` / `write_inventory` runs only inside an open
//! transaction: the row lock taken by `lock_for_update` is held until that
//! transaction commits or rolls back, and is the serialization point for
//! all stock changes on a book.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::{books, sea_orm_active_enums::BookStatus};

/// Error types for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum BookError {
    /// Book not found.
    #[error("Book not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a book.
#[derive(Debug, Clone)]
pub struct CreateBookInput {
    /// Title (required).
    pub title: String,
    /// Author.
    pub author: Option<String>,
    /// Publisher.
    pub publisher: Option<String>,
    /// Publication year.
    pub year: Option<i32>,
    /// Category label.
    pub category: Option<String>,
    /// Object key of an uploaded cover image.
    pub cover: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Initial number of loanable copies.
    pub stock: i32,
    /// Initial availability, supplied by the caller.
    pub status: BookStatus,
    /// Username of the admin who added the book.
    pub added_by: Option<String>,
}

/// Input for a full update of a book's catalog fields.
///
/// Stock and status are included because the catalog editor may correct
/// them; circulation changes go through `CirculationRepository` instead.
#[derive(Debug, Clone)]
pub struct UpdateBookInput {
    /// Title (required).
    pub title: String,
    /// Author.
    pub author: Option<String>,
    /// Publisher.
    pub publisher: Option<String>,
    /// Publication year.
    pub year: Option<i32>,
    /// Category label.
    pub category: Option<String>,
    /// Object key of the cover image after this update (None removes it).
    pub cover: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Number of loanable copies.
    pub stock: i32,
    /// Availability after this update.
    pub status: BookStatus,
    /// Username of the admin who last edited the book.
    pub added_by: Option<String>,
}

/// Book repository for catalog CRUD and locked inventory access.
#[derive(Debug, Clone)]
pub struct BookRepository {
    db: DatabaseConnection,
}

impl BookRepository {
    /// Creates a new book repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all books, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<books::Model>, DbErr> {
        books::Entity::find()
            .order_by_desc(books::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Finds a book by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<books::Model>, DbErr> {
        books::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new book.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: CreateBookInput) -> Result<books::Model, DbErr> {
        let now = Utc::now().into();
        let book = books::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title),
            author: Set(input.author),
            publisher: Set(input.publisher),
            year: Set(input.year),
            category: Set(input.category),
            cover: Set(input.cover),
            description: Set(input.description),
            stock: Set(input.stock),
            status: Set(input.status),
            added_by: Set(input.added_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        book.insert(&self.db).await
    }

    /// Applies a full update of a book's catalog fields.
    ///
    /// # Errors
    ///
    /// Returns `BookError::NotFound` if the book does not exist, or a
    /// database error if the update fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateBookInput,
    ) -> Result<books::Model, BookError> {
        let book = books::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(BookError::NotFound(id))?;

        let mut active: books::ActiveModel = book.into();
        active.title = Set(input.title);
        active.author = Set(input.author);
        active.publisher = Set(input.publisher);
        active.year = Set(input.year);
        active.category = Set(input.category);
        active.cover = Set(input.cover);
        active.description = Set(input.description);
        active.stock = Set(input.stock);
        active.status = Set(input.status);
        active.added_by = Set(input.added_by);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Deletes a book and returns the deleted row.
    ///
    /// Associated borrowings are removed by the `ON DELETE CASCADE`
    /// constraint; the returned row carries the cover key for cleanup.
    ///
    /// # Errors
    ///
    /// Returns `BookError::NotFound` if the book does not exist, or a
    /// database error if the delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<books::Model, BookError> {
        let book = books::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(BookError::NotFound(id))?;

        books::Entity::delete_by_id(id).exec(&self.db).await?;

        Ok(book)
    }

    /// Reads a book's row under an exclusive lock (`SELECT ... FOR UPDATE`).
    ///
    /// The lock is held for the remainder of `txn`; a concurrent
    /// transaction locking the same row blocks here until `txn` ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn lock_for_update(
        &self,
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<Option<books::Model>, DbErr> {
        books::Entity::find_by_id(id)
            .lock_exclusive()
            .one(txn)
            .await
    }

    /// Writes a book's inventory fields within the currently held lock.
    ///
    /// Must only be called on a row previously read via `lock_for_update`
    /// in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn write_inventory(
        &self,
        txn: &DatabaseTransaction,
        book: books::Model,
        stock: i32,
        status: BookStatus,
    ) -> Result<books::Model, DbErr> {
        let mut active: books::ActiveModel = book.into();
        active.stock = Set(stock);
        active.status = Set(status);
        active.updated_at = Set(Utc::now().into());

        active.update(txn).await
    }
}
