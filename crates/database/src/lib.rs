//! SQLite persistence layer for Otvet.
//!
//! This crate provides async database operations for accounts and their
//! marketplace reviews using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{account, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:otvet.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Register an account on first interaction
//!     let acct = account::get_or_create_account(db.pool(), 184021).await?;
//!     println!("notifications on: {}", acct.notifications_enabled);
//!
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod error;
pub mod models;
pub mod review;

pub use error::{DatabaseError, Result};
pub use models::{Account, NewReview, Review};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Sized for the sweep and interactive sessions running concurrently.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(url, pool_size, "Connected to database");

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        // One connection: each pooled connection to :memory: is its own database.
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn sample_review(account_id: i64, source_id: &str) -> NewReview {
        NewReview {
            account_id,
            source_id: source_id.to_string(),
            stars: 5,
            comment: "Отлично".to_string(),
            pros: "качество".to_string(),
            cons: String::new(),
            has_photos: false,
            photo_urls: "[]".to_string(),
            product_name: "Кружка".to_string(),
            product_id: "1234567".to_string(),
            supplier_article: "MUG-01".to_string(),
            subject_name: "Посуда".to_string(),
        }
    }

    #[tokio::test]
    async fn test_account_lifecycle() {
        let db = test_db().await;

        // First interaction creates a default row
        let acct = account::get_or_create_account(db.pool(), 42).await.unwrap();
        assert_eq!(acct.id, 42);
        assert!(acct.api_key.is_none());
        assert!(!acct.auto_reply_enabled);

        // Second call is a no-op
        account::get_or_create_account(db.pool(), 42).await.unwrap();
        assert_eq!(account::count_accounts(db.pool()).await.unwrap(), 1);

        // Settings update round-trips
        let updated = Account {
            api_key: Some("key-123".to_string()),
            notifications_enabled: true,
            auto_reply_enabled: true,
            greeting: Some("Здравствуйте!".to_string()),
            ..acct
        };
        account::update_account(db.pool(), &updated).await.unwrap();
        let fetched = account::get_account(db.pool(), 42).await.unwrap();
        assert_eq!(fetched, updated);

        // Only keyed accounts are visible to the sweep
        account::get_or_create_account(db.pool(), 43).await.unwrap();
        let keyed = account::list_accounts_with_key(db.pool()).await.unwrap();
        assert_eq!(keyed.len(), 1);
        assert_eq!(keyed[0].id, 42);
    }

    #[tokio::test]
    async fn test_review_insert_and_duplicate() {
        let db = test_db().await;
        account::get_or_create_account(db.pool(), 1).await.unwrap();

        let review = sample_review(1, "fb-100");

        let mut tx = db.pool().begin().await.unwrap();
        review::insert(&mut *tx, &review).await.unwrap();
        tx.commit().await.unwrap();

        assert!(review::exists(db.pool(), "fb-100", 1).await.unwrap());
        assert!(!review::exists(db.pool(), "fb-100", 2).await.unwrap());

        // Same (source_id, account_id) pair is rejected as AlreadyExists
        let mut tx = db.pool().begin().await.unwrap();
        let result = review::insert(&mut *tx, &review).await;
        assert!(matches!(
            result,
            Err(DatabaseError::AlreadyExists { entity: "Review", .. })
        ));
        tx.rollback().await.unwrap();

        // Same source id under another account is a distinct row
        account::get_or_create_account(db.pool(), 2).await.unwrap();
        let mut tx = db.pool().begin().await.unwrap();
        review::insert(&mut *tx, &sample_review(2, "fb-100"))
            .await
            .unwrap();
        tx.commit().await.unwrap();
        assert_eq!(review::count_for_account(db.pool(), 2).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_answered() {
        let db = test_db().await;
        account::get_or_create_account(db.pool(), 1).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        review::insert(&mut *tx, &sample_review(1, "fb-200")).await.unwrap();
        review::insert(&mut *tx, &sample_review(1, "fb-201")).await.unwrap();
        tx.commit().await.unwrap();

        let unanswered = review::list_unanswered(db.pool(), 1).await.unwrap();
        assert_eq!(unanswered.len(), 2);
        // Newest first
        assert_eq!(unanswered[0].source_id, "fb-201");

        let mut tx = db.pool().begin().await.unwrap();
        review::mark_answered(&mut *tx, "fb-200", 1, "Спасибо!").await.unwrap();
        tx.commit().await.unwrap();

        let unanswered = review::list_unanswered(db.pool(), 1).await.unwrap();
        assert_eq!(unanswered.len(), 1);
        assert_eq!(unanswered[0].source_id, "fb-201");

        let answered = review::get(db.pool(), 1, "fb-200").await.unwrap().unwrap();
        assert!(answered.answered);
        assert_eq!(answered.response.as_deref(), Some("Спасибо!"));

        // Unknown review id is NotFound
        let mut tx = db.pool().begin().await.unwrap();
        let result = review::mark_answered(&mut *tx, "fb-999", 1, "x").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_update_metadata_preserves_answered() {
        let db = test_db().await;
        account::get_or_create_account(db.pool(), 1).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        review::insert(&mut *tx, &sample_review(1, "fb-300")).await.unwrap();
        review::mark_answered(&mut *tx, "fb-300", 1, "Спасибо!").await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let updated = review::update_metadata(
            &mut *tx,
            "fb-300",
            1,
            true,
            r#"["https://img.example/1.jpg"]"#,
            "Кружка керамическая",
            "1234567",
            "MUG-01",
            "Посуда",
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();
        assert!(updated);

        let review = review::get(db.pool(), 1, "fb-300").await.unwrap().unwrap();
        assert!(review.has_photos);
        assert_eq!(review.product_name, "Кружка керамическая");
        // Backfill never flips the answered flag
        assert!(review.answered);
    }
}
