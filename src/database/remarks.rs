use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{NewRemark, Remark, RemarkChanges};

#[instrument]
pub async fn get_all_remarks(pool: &Pool<Sqlite>) -> Result<Vec<Remark>, AppError> {
    info!("Getting all remarks");
    let rows = sqlx::query_as::<_, Remark>(
        "SELECT id, skill, level, description FROM remarks ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[instrument]
pub async fn get_remark(pool: &Pool<Sqlite>, id: &str) -> Result<Remark, AppError> {
    info!("Fetching remark by ID");
    sqlx::query_as::<_, Remark>("SELECT id, skill, level, description FROM remarks WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("Remark", id))
}

#[instrument]
pub async fn create_remark(pool: &Pool<Sqlite>, remark: &NewRemark) -> Result<i64, AppError> {
    info!("Creating remark");
    let res = sqlx::query("INSERT INTO remarks (skill, level, description) VALUES (?, ?, ?)")
        .bind(&remark.skill)
        .bind(remark.level)
        .bind(&remark.description)
        .execute(pool)
        .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn update_remark(
    pool: &Pool<Sqlite>,
    id: &str,
    changes: &RemarkChanges,
) -> Result<(), AppError> {
    info!("Updating remark");
    let res = sqlx::query(
        "UPDATE remarks
         SET skill = COALESCE(?, skill),
             level = COALESCE(?, level),
             description = COALESCE(?, description)
         WHERE id = ?",
    )
    .bind(&changes.skill)
    .bind(changes.level)
    .bind(&changes.description)
    .bind(id)
    .execute(pool)
    .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::not_found("Remark", id));
    }

    Ok(())
}

#[instrument]
pub async fn delete_remark(pool: &Pool<Sqlite>, id: &str) -> Result<u64, AppError> {
    info!("Deleting remark");
    let res = sqlx::query("DELETE FROM remarks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(res.rows_affected())
}
