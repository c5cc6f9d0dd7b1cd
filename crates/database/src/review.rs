//! Review CRUD operations.
//!
//! Writers that take a `&mut SqliteConnection` are meant to run inside the
//! caller's transaction so that one reconciliation or auto-reply pass
//! commits atomically per account.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{NewReview, Review};

const SELECT_COLUMNS: &str = r#"
    SELECT id, account_id, source_id, stars, comment, pros, cons,
           has_photos, photo_urls, response, answered,
           product_name, product_id, supplier_article, subject_name
    FROM reviews
"#;

/// Check whether a review with this (source id, account) pair is stored.
pub async fn exists(pool: &SqlitePool, source_id: &str, account_id: i64) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM reviews
        WHERE source_id = ? AND account_id = ?
        "#,
    )
    .bind(source_id)
    .bind(account_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Insert a new review.
///
/// A violation of the (source id, account) uniqueness constraint is
/// reported as [`DatabaseError::AlreadyExists`] so callers can treat a
/// concurrent duplicate insert as an ordinary skip.
pub async fn insert(conn: &mut SqliteConnection, review: &NewReview) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reviews (
            account_id, source_id, stars, comment, pros, cons,
            has_photos, photo_urls, answered,
            product_name, product_id, supplier_article, subject_name
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)
        "#,
    )
    .bind(review.account_id)
    .bind(&review.source_id)
    .bind(review.stars)
    .bind(&review.comment)
    .bind(&review.pros)
    .bind(&review.cons)
    .bind(review.has_photos)
    .bind(&review.photo_urls)
    .bind(&review.product_name)
    .bind(&review.product_id)
    .bind(&review.supplier_article)
    .bind(&review.subject_name)
    .execute(conn)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Review",
                    id: review.source_id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Get a review by its (source id, account) pair.
pub async fn get(pool: &SqlitePool, account_id: i64, source_id: &str) -> Result<Option<Review>> {
    let review = sqlx::query_as::<_, Review>(&format!(
        "{SELECT_COLUMNS} WHERE account_id = ? AND source_id = ?"
    ))
    .bind(account_id)
    .bind(source_id)
    .fetch_optional(pool)
    .await?;

    Ok(review)
}

/// List all unanswered reviews for an account, newest first.
pub async fn list_unanswered(pool: &SqlitePool, account_id: i64) -> Result<Vec<Review>> {
    let reviews = sqlx::query_as::<_, Review>(&format!(
        "{SELECT_COLUMNS} WHERE account_id = ? AND answered = 0 ORDER BY id DESC"
    ))
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    Ok(reviews)
}

/// Mark a review as answered, recording the submitted reply text.
///
/// Only called after the remote API confirmed the reply; an unanswered
/// review stays eligible for the next pass.
pub async fn mark_answered(
    conn: &mut SqliteConnection,
    source_id: &str,
    account_id: i64,
    response: &str,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE reviews
        SET response = ?, answered = 1
        WHERE source_id = ? AND account_id = ?
        "#,
    )
    .bind(response)
    .bind(source_id)
    .bind(account_id)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Review",
            id: source_id.to_string(),
        });
    }

    Ok(())
}

/// Update photo URLs and product metadata of an already-stored review.
///
/// Used by the backfill pass; never touches the answered flag.
pub async fn update_metadata(
    conn: &mut SqliteConnection,
    source_id: &str,
    account_id: i64,
    has_photos: bool,
    photo_urls: &str,
    product_name: &str,
    product_id: &str,
    supplier_article: &str,
    subject_name: &str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE reviews
        SET has_photos = ?, photo_urls = ?,
            product_name = ?, product_id = ?, supplier_article = ?, subject_name = ?
        WHERE source_id = ? AND account_id = ?
        "#,
    )
    .bind(has_photos)
    .bind(photo_urls)
    .bind(product_name)
    .bind(product_id)
    .bind(supplier_article)
    .bind(subject_name)
    .bind(source_id)
    .bind(account_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Count reviews stored for an account.
pub async fn count_for_account(pool: &SqlitePool, account_id: i64) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM reviews WHERE account_id = ?
        "#,
    )
    .bind(account_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
