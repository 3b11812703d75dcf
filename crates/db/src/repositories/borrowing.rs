//! Borrowing repository for the circulation ledger.
//!
//! A borrowing row is the record of one copy out on loan. Rows are created
//! and destroyed only by `CirculationRepository`, always inside the same
//! transaction as the paired stock change on the book.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::borrowings;

/// Borrower details captured when a copy is lent out.
#[derive(Debug, Clone)]
pub struct BorrowerInput {
    /// Borrower's name.
    pub borrower_name: String,
    /// Borrower's phone number.
    pub borrower_phone: String,
    /// Username of the admin who processed the loan.
    pub handled_by: String,
}

/// Borrowing repository for ledger operations.
#[derive(Debug, Clone)]
pub struct BorrowingRepository {
    db: DatabaseConnection,
}

impl BorrowingRepository {
    /// Creates a new borrowing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a borrowing row with a fresh id and the current timestamp,
    /// within the currently open transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn insert(
        &self,
        txn: &DatabaseTransaction,
        book_id: Uuid,
        input: BorrowerInput,
    ) -> Result<borrowings::Model, DbErr> {
        let borrowing = borrowings::ActiveModel {
            id: Set(Uuid::new_v4()),
            book_id: Set(book_id),
            borrower_name: Set(input.borrower_name),
            borrower_phone: Set(input.borrower_phone),
            handled_by: Set(input.handled_by),
            borrowed_at: Set(Utc::now().into()),
        };

        borrowing.insert(txn).await
    }

    /// Deletes the borrowing row iff both its id and its book id match,
    /// returning the deleted record.
    ///
    /// The double key stops a caller from returning a loan against the
    /// wrong book. Returns `None` when no row matches both keys — including
    /// when a concurrent transaction already deleted it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete_matching(
        &self,
        txn: &DatabaseTransaction,
        borrowing_id: Uuid,
        book_id: Uuid,
    ) -> Result<Option<borrowings::Model>, DbErr> {
        let Some(borrowing) = borrowings::Entity::find_by_id(borrowing_id)
            .filter(borrowings::Column::BookId.eq(book_id))
            .one(txn)
            .await?
        else {
            return Ok(None);
        };

        let result = borrowings::Entity::delete_many()
            .filter(borrowings::Column::Id.eq(borrowing_id))
            .filter(borrowings::Column::BookId.eq(book_id))
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        Ok(Some(borrowing))
    }

    /// Counts the borrowings currently open against a book, within the
    /// given transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_active(
        &self,
        txn: &DatabaseTransaction,
        book_id: Uuid,
    ) -> Result<u64, DbErr> {
        borrowings::Entity::find()
            .filter(borrowings::Column::BookId.eq(book_id))
            .count(txn)
            .await
    }

    /// Lists the open borrowings for one book, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_book(&self, book_id: Uuid) -> Result<Vec<borrowings::Model>, DbErr> {
        borrowings::Entity::find()
            .filter(borrowings::Column::BookId.eq(book_id))
            .order_by_asc(borrowings::Column::BorrowedAt)
            .all(&self.db)
            .await
    }

    /// Lists the open borrowings for a set of books, oldest first.
    ///
    /// Used by the catalog listing to embed borrowers per book in one
    /// query instead of one per row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_books(
        &self,
        book_ids: &[Uuid],
    ) -> Result<Vec<borrowings::Model>, DbErr> {
        if book_ids.is_empty() {
            return Ok(Vec::new());
        }

        borrowings::Entity::find()
            .filter(borrowings::Column::BookId.is_in(book_ids.iter().copied()))
            .order_by_asc(borrowings::Column::BorrowedAt)
            .all(&self.db)
            .await
    }
}
