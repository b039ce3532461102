use sqlx::{Pool, Sqlite};
use tracing::{info, instrument, warn};

use crate::error::AppError;

#[instrument(skip(pool))]
pub async fn get_password_hash(
    pool: &Pool<Sqlite>,
    username: &str,
) -> Result<Option<String>, AppError> {
    let hash = sqlx::query_scalar::<_, String>(
        "SELECT password_hash FROM credentials WHERE username = ? LIMIT 1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(hash)
}

/// Checks a plaintext password against the stored bcrypt hash.
///
/// An unknown username fails without running bcrypt. Callers must not
/// tell the two failure modes apart in their responses.
#[instrument(skip_all, fields(username))]
pub async fn verify_credentials(
    pool: &Pool<Sqlite>,
    username: &str,
    password: &str,
) -> Result<bool, AppError> {
    let Some(hash) = get_password_hash(pool, username).await? else {
        warn!(username = %username, "No credentials stored for username");
        return Ok(false);
    };

    match bcrypt::verify(password, &hash) {
        Ok(valid) => Ok(valid),
        Err(e) => {
            warn!(username = %username, error = %e, "Stored password hash is unusable");
            Ok(false)
        }
    }
}

/// Stores (or replaces) the bcrypt hash for `username`.
#[instrument(skip(pool, password))]
pub async fn store_credential(
    pool: &Pool<Sqlite>,
    username: &str,
    password: &str,
    cost: u32,
) -> Result<(), AppError> {
    info!("Storing credential");
    let hashed_password = bcrypt::hash(password, cost)?;

    sqlx::query(
        "INSERT INTO credentials (username, password_hash) VALUES (?, ?)
         ON CONFLICT (username) DO UPDATE SET password_hash = excluded.password_hash",
    )
    .bind(username)
    .bind(hashed_password)
    .execute(pool)
    .await?;

    Ok(())
}
