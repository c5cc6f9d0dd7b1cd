//! Account CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Account;

const SELECT_COLUMNS: &str = r#"
    SELECT id, api_key, notifications_enabled, auto_reply_enabled,
           auto_reply_five_stars, greeting, farewell
    FROM accounts
"#;

/// Get an account by id.
pub async fn get_account(pool: &SqlitePool, id: i64) -> Result<Account> {
    sqlx::query_as::<_, Account>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Account",
            id: id.to_string(),
        })
}

/// Get an account by id, creating a default row on first interaction.
pub async fn get_or_create_account(pool: &SqlitePool, id: i64) -> Result<Account> {
    sqlx::query(
        r#"
        INSERT INTO accounts (id)
        VALUES (?)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    get_account(pool, id).await
}

/// Update an account's settings (credential, toggles, reply fragments).
pub async fn update_account(pool: &SqlitePool, account: &Account) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE accounts
        SET api_key = ?, notifications_enabled = ?, auto_reply_enabled = ?,
            auto_reply_five_stars = ?, greeting = ?, farewell = ?
        WHERE id = ?
        "#,
    )
    .bind(&account.api_key)
    .bind(account.notifications_enabled)
    .bind(account.auto_reply_enabled)
    .bind(account.auto_reply_five_stars)
    .bind(&account.greeting)
    .bind(&account.farewell)
    .bind(account.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Account",
            id: account.id.to_string(),
        });
    }

    Ok(())
}

/// List all accounts.
pub async fn list_accounts(pool: &SqlitePool) -> Result<Vec<Account>> {
    let accounts = sqlx::query_as::<_, Account>(&format!("{SELECT_COLUMNS} ORDER BY id"))
        .fetch_all(pool)
        .await?;

    Ok(accounts)
}

/// List accounts that have an API credential configured.
///
/// These are the accounts the reconciliation sweep visits.
pub async fn list_accounts_with_key(pool: &SqlitePool) -> Result<Vec<Account>> {
    let accounts = sqlx::query_as::<_, Account>(&format!(
        "{SELECT_COLUMNS} WHERE api_key IS NOT NULL AND api_key != '' ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(accounts)
}

/// Count total accounts.
pub async fn count_accounts(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
