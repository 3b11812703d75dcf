//! Initial database migration.
//!
//! Creates the catalog, admin, and circulation tables with their enums,
//! constraints, and indexes.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: ADMIN ACCOUNTS
        // ============================================================
        db.execute_unprepared(ADMINS_SQL).await?;

        // ============================================================
        // PART 3: CATALOG
        // ============================================================
        db.execute_unprepared(BOOKS_SQL).await?;

        // ============================================================
        // PART 4: CIRCULATION LEDGER
        // ============================================================
        db.execute_unprepared(BORROWINGS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Derived availability of a book
CREATE TYPE book_status AS ENUM ('available', 'borrowed');
";

const ADMINS_SQL: &str = r"
CREATE TABLE admins (
    id UUID PRIMARY KEY,
    username VARCHAR(100) UNIQUE NOT NULL,
    password_hash VARCHAR(255) NOT NULL,
    full_name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const BOOKS_SQL: &str = r"
CREATE TABLE books (
    id UUID PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    author VARCHAR(255),
    publisher VARCHAR(255),
    year INTEGER,
    category VARCHAR(100),
    cover TEXT,
    description TEXT,
    stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
    status book_status NOT NULL,
    added_by VARCHAR(100),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_books_created_at ON books (created_at DESC);
";

const BORROWINGS_SQL: &str = r"
CREATE TABLE borrowings (
    id UUID PRIMARY KEY,
    book_id UUID NOT NULL REFERENCES books (id) ON DELETE CASCADE,
    borrower_name VARCHAR(255) NOT NULL,
    borrower_phone VARCHAR(50) NOT NULL,
    handled_by VARCHAR(100) NOT NULL,
    borrowed_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_borrowings_book_id ON borrowings (book_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS borrowings;
DROP TABLE IF EXISTS books;
DROP TABLE IF EXISTS admins;
DROP TYPE IF EXISTS book_status;
";
