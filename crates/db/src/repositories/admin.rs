//! Admin repository for database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::admins;

/// Admin repository for account lookups and provisioning.
#[derive(Debug, Clone)]
pub struct AdminRepository {
    db: DatabaseConnection,
}

impl AdminRepository {
    /// Creates a new admin repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an admin by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<admins::Model>, DbErr> {
        admins::Entity::find()
            .filter(admins::Column::Username.eq(username))
            .one(&self.db)
            .await
    }

    /// Creates a new admin account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        full_name: &str,
    ) -> Result<admins::Model, DbErr> {
        let now = Utc::now().into();
        let admin = admins::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
            full_name: Set(full_name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        admin.insert(&self.db).await
    }

    /// Checks if a username is already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn username_exists(&self, username: &str) -> Result<bool, DbErr> {
        let count = admins::Entity::find()
            .filter(admins::Column::Username.eq(username))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}
