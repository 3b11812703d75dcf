//! Database seeder for Biblio development and testing.
//!
//! Provisions the default admin account (with a hashed password) and a
//! couple of sample catalog rows. Safe to run repeatedly: existing rows
//! are left alone.

use biblio_core::auth::hash_password;
use biblio_db::entities::sea_orm_active_enums::BookStatus;
use biblio_db::repositories::{AdminRepository, BookRepository, CreateBookInput};
use biblio_shared::AppConfig;

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "password";
const DEFAULT_FULL_NAME: &str = "Biblio Administrator";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let db = biblio_db::connect(&config.database).await?;

    let admin_repo = AdminRepository::new(db.clone());
    if admin_repo.username_exists(DEFAULT_USERNAME).await? {
        println!("Admin '{DEFAULT_USERNAME}' already exists, skipping");
    } else {
        let password_hash = hash_password(DEFAULT_PASSWORD)?;
        admin_repo
            .create(DEFAULT_USERNAME, &password_hash, DEFAULT_FULL_NAME)
            .await?;
        println!(
            "Created admin '{DEFAULT_USERNAME}' with password '{DEFAULT_PASSWORD}' - change it"
        );
    }

    let book_repo = BookRepository::new(db.clone());
    if book_repo.list().await?.is_empty() {
        for input in sample_books() {
            let book = book_repo.create(input).await?;
            println!("Seeded book '{}'", book.title);
        }
    } else {
        println!("Catalog already has books, skipping samples");
    }

    Ok(())
}

fn sample_books() -> Vec<CreateBookInput> {
    vec![
        CreateBookInput {
            title: "The Rust Programming Language".to_string(),
            author: Some("Steve Klabnik & Carol Nichols".to_string()),
            publisher: Some("No Starch Press".to_string()),
            year: Some(2023),
            category: Some("Programming".to_string()),
            cover: None,
            description: Some("The official book on Rust".to_string()),
            stock: 3,
            status: BookStatus::Available,
            added_by: Some(DEFAULT_USERNAME.to_string()),
        },
        CreateBookInput {
            title: "Designing Data-Intensive Applications".to_string(),
            author: Some("Martin Kleppmann".to_string()),
            publisher: Some("O'Reilly Media".to_string()),
            year: Some(2017),
            category: Some("Databases".to_string()),
            cover: None,
            description: None,
            stock: 1,
            status: BookStatus::Available,
            added_by: Some(DEFAULT_USERNAME.to_string()),
        },
    ]
}
