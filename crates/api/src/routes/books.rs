//! Book catalog routes.
//!
//! Create and update accept multipart forms so a cover image can ride along
//! with the catalog fields. The image is stored before the row is written;
//! if the row write then fails, the freshly stored object is removed again
//! so no orphan is left behind.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::routes::circulation::BorrowingResponse;
use biblio_core::covers::CoverStorage;
use biblio_db::entities::{books, borrowings, sea_orm_active_enums::BookStatus};
use biblio_db::repositories::{
    BookRepository, BorrowingRepository, CreateBookInput, UpdateBookInput,
};
use biblio_shared::AppError;

/// Creates the book catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/{id}", put(update_book).delete(delete_book))
}

// ============================================================================
// Response Types
// ============================================================================

/// A catalog entry with its open borrowings embedded.
#[derive(Debug, Serialize)]
pub struct BookResponse {
    /// Book ID.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Author.
    pub author: Option<String>,
    /// Publisher.
    pub publisher: Option<String>,
    /// Publication year.
    pub year: Option<i32>,
    /// Category label.
    pub category: Option<String>,
    /// Object key of the stored cover image.
    pub cover: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Copies currently on the shelf.
    pub stock: i32,
    /// Derived availability.
    pub status: BookStatus,
    /// Username of the admin who added the book.
    pub added_by: Option<String>,
    /// Created at timestamp (ISO 8601).
    pub created_at: String,
    /// Open borrowings against this book.
    pub borrowers: Vec<BorrowingResponse>,
}

impl BookResponse {
    fn new(book: books::Model, open_borrowings: Vec<borrowings::Model>) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            publisher: book.publisher,
            year: book.year,
            category: book.category,
            cover: book.cover,
            description: book.description,
            stock: book.stock,
            status: book.status,
            added_by: book.added_by,
            created_at: book.created_at.to_rfc3339(),
            borrowers: open_borrowings
                .into_iter()
                .map(BorrowingResponse::from)
                .collect(),
        }
    }
}

// ============================================================================
// Multipart Form Handling
// ============================================================================

/// A cover image pulled out of the multipart form.
struct UploadedCover {
    filename: String,
    content_type: String,
    data: Vec<u8>,
}

/// Catalog fields pulled out of the multipart form.
#[derive(Default)]
struct BookForm {
    title: Option<String>,
    author: Option<String>,
    publisher: Option<String>,
    year: Option<String>,
    category: Option<String>,
    stock: Option<String>,
    description: Option<String>,
    status: Option<String>,
    added_by: Option<String>,
    existing_cover: Option<String>,
    cover_file: Option<UploadedCover>,
}

/// Drains a multipart request into a `BookForm`.
async fn read_book_form(mut multipart: Multipart) -> Result<BookForm, ApiError> {
    let mut form = BookForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(AppError::Validation(format!("could not read form: {e}")).into());
            }
        };

        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        if name == "cover_file" {
            let filename = field.file_name().unwrap_or("cover").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();

            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("could not read cover: {e}")))?;
            if !bytes.is_empty() {
                form.cover_file = Some(UploadedCover {
                    filename,
                    content_type,
                    data: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("could not read field '{name}': {e}")))?;

        match name.as_str() {
            "title" => form.title = non_empty(value),
            "author" => form.author = non_empty(value),
            "publisher" => form.publisher = non_empty(value),
            "year" => form.year = non_empty(value),
            "category" => form.category = non_empty(value),
            "stock" => form.stock = non_empty(value),
            "description" => form.description = non_empty(value),
            "status" => form.status = non_empty(value),
            "added_by" => form.added_by = non_empty(value),
            "existing_cover" => form.existing_cover = non_empty(value),
            _ => {}
        }
    }

    Ok(form)
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Parses the publication year; a missing or unparseable value is dropped.
fn parse_year(raw: Option<&str>) -> Option<i32> {
    raw.and_then(|value| value.trim().parse().ok())
}

/// Parses the stock count; a missing or unparseable value counts as zero.
fn parse_stock(raw: Option<&str>) -> i32 {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(0)
}

/// Parses an availability label; `None` means the value was unrecognized.
fn parse_status(raw: &str) -> Option<BookStatus> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "available" => Some(BookStatus::Available),
        "borrowed" => Some(BookStatus::Borrowed),
        _ => None,
    }
}

/// Availability assigned when the form carries no status.
fn default_status_for(stock: i32) -> BookStatus {
    if stock > 0 {
        BookStatus::Available
    } else {
        BookStatus::Borrowed
    }
}

/// Resolves the status field of a form against its stock count.
fn resolve_status(raw: Option<&str>, stock: i32) -> Result<BookStatus, ApiError> {
    match raw {
        None => Ok(default_status_for(stock)),
        Some(value) => parse_status(value).ok_or_else(|| {
            AppError::Validation("status must be 'available' or 'borrowed'".to_string()).into()
        }),
    }
}

fn require_title(form: &BookForm) -> Result<String, ApiError> {
    form.title
        .clone()
        .ok_or_else(|| AppError::Validation("title is required".to_string()).into())
}

/// Groups open borrowings by their book.
fn group_borrowings(rows: Vec<borrowings::Model>) -> HashMap<Uuid, Vec<borrowings::Model>> {
    let mut grouped: HashMap<Uuid, Vec<borrowings::Model>> = HashMap::new();
    for row in rows {
        grouped.entry(row.book_id).or_default().push(row);
    }
    grouped
}

// ============================================================================
// Cover Storage Helpers
// ============================================================================

/// Stores an uploaded cover, or fails if no storage is configured.
async fn store_cover(
    covers: Option<&Arc<CoverStorage>>,
    upload: UploadedCover,
) -> Result<String, ApiError> {
    let Some(covers) = covers else {
        return Err(
            AppError::ExternalService("cover image storage is not configured".to_string()).into(),
        );
    };

    let key = covers
        .store(
            Uuid::new_v4(),
            &upload.filename,
            &upload.content_type,
            upload.data,
        )
        .await?;

    Ok(key)
}

/// Removes a stored cover, logging rather than failing the request.
async fn remove_cover(covers: Option<&Arc<CoverStorage>>, key: &str) {
    if let Some(covers) = covers {
        if let Err(e) = covers.remove(key).await {
            warn!(key = %key, error = %e, "Failed to remove cover image");
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /books - List the catalog with open borrowings embedded.
async fn list_books(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let book_repo = BookRepository::new((*state.db).clone());
    let borrowing_repo = BorrowingRepository::new((*state.db).clone());

    let book_rows = book_repo.list().await?;
    let book_ids: Vec<Uuid> = book_rows.iter().map(|b| b.id).collect();
    let borrowing_rows = borrowing_repo.list_for_books(&book_ids).await?;

    let mut grouped = group_borrowings(borrowing_rows);
    let items: Vec<BookResponse> = book_rows
        .into_iter()
        .map(|book| {
            let open = grouped.remove(&book.id).unwrap_or_default();
            BookResponse::new(book, open)
        })
        .collect();

    Ok(Json(items))
}

/// POST /books - Add a book to the catalog.
async fn create_book(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_book_form(multipart).await?;
    let title = require_title(&form)?;

    let stock = parse_stock(form.stock.as_deref());
    let status = resolve_status(form.status.as_deref(), stock)?;

    let cover = match form.cover_file {
        Some(upload) => Some(store_cover(state.covers.as_ref(), upload).await?),
        None => None,
    };

    let book_repo = BookRepository::new((*state.db).clone());
    let input = CreateBookInput {
        title,
        author: form.author,
        publisher: form.publisher,
        year: parse_year(form.year.as_deref()),
        category: form.category,
        cover: cover.clone(),
        description: form.description,
        stock,
        status,
        added_by: form.added_by,
    };

    let book = match book_repo.create(input).await {
        Ok(book) => book,
        Err(e) => {
            // Do not leave the freshly stored image orphaned.
            if let Some(key) = cover {
                remove_cover(state.covers.as_ref(), &key).await;
            }
            return Err(e.into());
        }
    };

    info!(book_id = %book.id, title = %book.title, "Book added to catalog");
    Ok((
        StatusCode::CREATED,
        Json(BookResponse::new(book, Vec::new())),
    ))
}

/// PUT /books/{id} - Apply a full update of a book's catalog fields.
async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_book_form(multipart).await?;
    let title = require_title(&form)?;

    let book_repo = BookRepository::new((*state.db).clone());

    let existing = book_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {id}")))?;
    let old_cover = existing.cover;

    // Three cover cases: a new upload replaces the old image, an
    // `existing_cover` marker keeps it, and an absent field removes it.
    let cover = if let Some(upload) = form.cover_file {
        let key = store_cover(state.covers.as_ref(), upload).await?;
        if let Some(old) = &old_cover {
            remove_cover(state.covers.as_ref(), old).await;
        }
        Some(key)
    } else if form.existing_cover.is_some() {
        old_cover
    } else {
        if let Some(old) = &old_cover {
            remove_cover(state.covers.as_ref(), old).await;
        }
        None
    };

    let stock = parse_stock(form.stock.as_deref());
    let status = resolve_status(form.status.as_deref(), stock)?;

    let input = UpdateBookInput {
        title,
        author: form.author,
        publisher: form.publisher,
        year: parse_year(form.year.as_deref()),
        category: form.category,
        cover,
        description: form.description,
        stock,
        status,
        added_by: form.added_by,
    };

    let updated = book_repo.update(id, input).await?;

    let borrowing_repo = BorrowingRepository::new((*state.db).clone());
    let open = borrowing_repo.list_for_book(id).await?;

    info!(book_id = %id, "Book updated");
    Ok(Json(BookResponse::new(updated, open)))
}

/// DELETE /books/{id} - Remove a book from the catalog.
///
/// Open borrowings are removed by the database cascade; the stored cover
/// image is deleted afterwards.
async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let book_repo = BookRepository::new((*state.db).clone());

    let deleted = book_repo.delete(id).await?;
    if let Some(key) = deleted.cover {
        remove_cover(state.covers.as_ref(), &key).await;
    }

    info!(book_id = %id, "Book removed from catalog");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("1999"), Some(1999))]
    #[case(Some(" 2024 "), Some(2024))]
    #[case(Some("not-a-year"), None)]
    #[case(None, None)]
    fn test_parse_year(#[case] raw: Option<&str>, #[case] expected: Option<i32>) {
        assert_eq!(parse_year(raw), expected);
    }

    #[rstest]
    #[case(Some("3"), 3)]
    #[case(Some("0"), 0)]
    #[case(Some("three"), 0)]
    #[case(None, 0)]
    fn test_parse_stock(#[case] raw: Option<&str>, #[case] expected: i32) {
        assert_eq!(parse_stock(raw), expected);
    }

    #[rstest]
    #[case("available", Some(BookStatus::Available))]
    #[case("Borrowed", Some(BookStatus::Borrowed))]
    #[case(" AVAILABLE ", Some(BookStatus::Available))]
    #[case("lost", None)]
    fn test_parse_status(#[case] raw: &str, #[case] expected: Option<BookStatus>) {
        assert_eq!(parse_status(raw), expected);
    }

    #[test]
    fn test_default_status_tracks_stock() {
        assert_eq!(default_status_for(2), BookStatus::Available);
        assert_eq!(default_status_for(0), BookStatus::Borrowed);
    }

    #[test]
    fn test_non_empty_drops_whitespace() {
        assert_eq!(non_empty("  ".to_string()), None);
        assert_eq!(non_empty("x".to_string()), Some("x".to_string()));
    }

    #[test]
    fn test_group_borrowings_by_book() {
        let book_a = Uuid::new_v4();
        let book_b = Uuid::new_v4();
        let row = |book_id: Uuid| borrowings::Model {
            id: Uuid::new_v4(),
            book_id,
            borrower_name: "Alice".to_string(),
            borrower_phone: "555-0100".to_string(),
            handled_by: "staff1".to_string(),
            borrowed_at: chrono::Utc::now().into(),
        };

        let grouped = group_borrowings(vec![row(book_a), row(book_b), row(book_a)]);

        assert_eq!(grouped[&book_a].len(), 2);
        assert_eq!(grouped[&book_b].len(), 1);
    }
}
