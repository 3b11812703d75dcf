//! Circulation repository for borrow and return transactions.
//!
//! Each operation runs as one database transaction pairing exactly one
//! stock change (±1) with exactly one ledger mutation. The exclusive row
//! lock on the book serializes transactions touching the same book;
//! transactions on different books proceed in parallel. Every failure path
//! rolls the whole transaction back — a stock change is never committed
//! without its paired borrowing row, nor the reverse.

use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use uuid::Uuid;

use biblio_core::circulation;

use super::book::BookRepository;
use super::borrowing::{BorrowerInput, BorrowingRepository};
use crate::entities::{borrowings, sea_orm_active_enums::BookStatus};

/// Error types for circulation operations.
#[derive(Debug, thiserror::Error)]
pub enum CirculationError {
    /// Book not found.
    #[error("Book not found: {0}")]
    BookNotFound(Uuid),

    /// No borrowing matches the given (borrowing, book) pair.
    #[error("Borrowing {borrowing_id} not found for book {book_id}")]
    BorrowingNotFound {
        /// Borrowing id supplied by the caller.
        borrowing_id: Uuid,
        /// Book id supplied by the caller.
        book_id: Uuid,
    },

    /// No copies left to lend.
    #[error("No available copies of book {0}")]
    OutOfStock(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for a borrow transaction.
#[derive(Debug, Clone)]
pub struct BorrowRequest {
    /// Book to lend a copy of.
    pub book_id: Uuid,
    /// Borrower's name.
    pub borrower_name: String,
    /// Borrower's phone number.
    pub borrower_phone: String,
    /// Username of the admin processing the loan.
    pub handled_by: String,
}

/// Result of a committed borrow transaction.
#[derive(Debug, Clone)]
pub struct BorrowOutcome {
    /// The created borrowing row.
    pub borrowing: borrowings::Model,
    /// Title of the book, for the confirmation message.
    pub book_title: String,
    /// Stock count after the decrement.
    pub new_stock: i32,
    /// Availability after the decrement.
    pub new_status: BookStatus,
}

/// Circulation repository orchestrating borrow and return transactions.
#[derive(Debug, Clone)]
pub struct CirculationRepository {
    db: DatabaseConnection,
    books: BookRepository,
    borrowings: BorrowingRepository,
}

impl CirculationRepository {
    /// Creates a new circulation repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            books: BookRepository::new(db.clone()),
            borrowings: BorrowingRepository::new(db.clone()),
            db,
        }
    }

    /// Lends one copy of a book.
    ///
    /// Locks the book row, checks stock, then commits the stock decrement
    /// together with the new borrowing row. Two callers racing for the last
    /// copy serialize on the row lock: the first to lock wins, the second
    /// observes the decremented stock and fails with `OutOfStock`.
    ///
    /// # Errors
    ///
    /// Returns `BookNotFound` if the book does not exist, `OutOfStock` if
    /// no copy is on the shelf, or a database error. Nothing is mutated on
    /// any failure.
    pub async fn borrow_copy(
        &self,
        request: BorrowRequest,
    ) -> Result<BorrowOutcome, CirculationError> {
        let txn = self.db.begin().await?;

        // Dropping `txn` on any `?` below rolls the transaction back.
        let book = self
            .books
            .lock_for_update(&txn, request.book_id)
            .await?
            .ok_or(CirculationError::BookNotFound(request.book_id))?;

        if book.stock <= 0 {
            txn.rollback().await?;
            return Err(CirculationError::OutOfStock(request.book_id));
        }

        let new_stock = book.stock - 1;
        let new_status = BookStatus::from(circulation::after_borrow(new_stock));
        let book_title = book.title.clone();

        self.books
            .write_inventory(&txn, book, new_stock, new_status)
            .await?;

        let borrowing = self
            .borrowings
            .insert(
                &txn,
                request.book_id,
                BorrowerInput {
                    borrower_name: request.borrower_name,
                    borrower_phone: request.borrower_phone,
                    handled_by: request.handled_by,
                },
            )
            .await?;

        txn.commit().await?;

        Ok(BorrowOutcome {
            borrowing,
            book_title,
            new_stock,
            new_status,
        })
    }

    /// Takes back one copy of a book.
    ///
    /// Deletes the borrowing matched by both keys, locks the book row,
    /// then commits the stock increment together with the recomputed
    /// status. The status derivation also looks at the borrowings still
    /// open after the delete.
    ///
    /// # Errors
    ///
    /// Returns `BorrowingNotFound` if no borrowing matches both keys,
    /// `BookNotFound` if the book row itself is gone, or a database error.
    /// Nothing is mutated on any failure.
    pub async fn return_copy(
        &self,
        book_id: Uuid,
        borrowing_id: Uuid,
    ) -> Result<(), CirculationError> {
        let txn = self.db.begin().await?;

        let deleted = self
            .borrowings
            .delete_matching(&txn, borrowing_id, book_id)
            .await?;

        if deleted.is_none() {
            txn.rollback().await?;
            return Err(CirculationError::BorrowingNotFound {
                borrowing_id,
                book_id,
            });
        }

        // The FK guarantees the book exists while borrowings reference it,
        // but the row could vanish between the delete and here if the book
        // had no other borrowings; treat that as NotFound rather than panic.
        let book = self
            .books
            .lock_for_update(&txn, book_id)
            .await?
            .ok_or(CirculationError::BookNotFound(book_id))?;

        let new_stock = book.stock + 1;
        let open_borrowings = self.borrowings.count_active(&txn, book_id).await?;
        let new_status = BookStatus::from(circulation::after_return(new_stock, open_borrowings));

        self.books
            .write_inventory(&txn, book, new_stock, new_status)
            .await?;

        txn.commit().await?;

        Ok(())
    }
}
