use std::collections::BTreeSet;

use sqlx::{Pool, Sqlite, SqliteConnection};
use tracing::{info, instrument};

use crate::database::get_classes_for_teachers;
use crate::error::AppError;
use crate::models::{DbTeacher, NewTeacher, Teacher, TeacherChanges};

#[instrument]
pub async fn get_all_teachers(pool: &Pool<Sqlite>) -> Result<Vec<Teacher>, AppError> {
    info!("Getting all teachers");
    let rows = sqlx::query_as::<_, DbTeacher>("SELECT id, name, surname FROM teachers ORDER BY id")
        .fetch_all(pool)
        .await?;

    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let mut classes = get_classes_for_teachers(pool, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let teacher_classes = classes.remove(&row.id).unwrap_or_default();
            row.with_classes(teacher_classes)
        })
        .collect())
}

#[instrument]
pub async fn get_teacher(pool: &Pool<Sqlite>, id: &str) -> Result<Teacher, AppError> {
    info!("Fetching teacher by ID");
    let row = sqlx::query_as::<_, DbTeacher>("SELECT id, name, surname FROM teachers WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("Teacher", id))?;

    let mut classes = get_classes_for_teachers(pool, &[row.id]).await?;
    let teacher_classes = classes.remove(&row.id).unwrap_or_default();

    Ok(row.with_classes(teacher_classes))
}

#[instrument]
pub async fn get_teacher_class_ids(pool: &Pool<Sqlite>, id: i64) -> Result<Vec<i64>, AppError> {
    let mut conn = pool.acquire().await?;
    current_class_ids(&mut conn, id).await
}

async fn current_class_ids(conn: &mut SqliteConnection, teacher_id: i64) -> Result<Vec<i64>, AppError> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT class_id FROM classes_teachers WHERE teacher_id = ? ORDER BY class_id",
    )
    .bind(teacher_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(ids)
}

/// Makes the teacher's class links equal `class_ids`, touching only the
/// links that differ.
async fn sync_teacher_classes(
    conn: &mut SqliteConnection,
    teacher_id: i64,
    class_ids: &[i64],
) -> Result<(), AppError> {
    let wanted: BTreeSet<i64> = class_ids.iter().copied().collect();
    let existing: BTreeSet<i64> = current_class_ids(conn, teacher_id)
        .await?
        .into_iter()
        .collect();

    for class_id in existing.difference(&wanted) {
        sqlx::query("DELETE FROM classes_teachers WHERE teacher_id = ? AND class_id = ?")
            .bind(teacher_id)
            .bind(class_id)
            .execute(&mut *conn)
            .await?;
    }

    for class_id in wanted.difference(&existing) {
        sqlx::query("INSERT INTO classes_teachers (teacher_id, class_id) VALUES (?, ?)")
            .bind(teacher_id)
            .bind(class_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

#[instrument]
pub async fn create_teacher(pool: &Pool<Sqlite>, teacher: &NewTeacher) -> Result<i64, AppError> {
    info!("Creating teacher");
    let mut tx = pool.begin().await?;

    let res = sqlx::query("INSERT INTO teachers (name, surname) VALUES (?, ?)")
        .bind(&teacher.name)
        .bind(&teacher.surname)
        .execute(&mut *tx)
        .await?;
    let id = res.last_insert_rowid();

    sync_teacher_classes(&mut *tx, id, &teacher.class_ids).await?;

    tx.commit().await?;

    Ok(id)
}

#[instrument]
pub async fn update_teacher(
    pool: &Pool<Sqlite>,
    id: &str,
    changes: &TeacherChanges,
) -> Result<(), AppError> {
    info!("Updating teacher");
    let mut tx = pool.begin().await?;

    let teacher_id = sqlx::query_scalar::<_, i64>("SELECT id FROM teachers WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Teacher", id))?;

    sqlx::query(
        "UPDATE teachers
         SET name = COALESCE(?, name), surname = COALESCE(?, surname)
         WHERE id = ?",
    )
    .bind(&changes.name)
    .bind(&changes.surname)
    .bind(teacher_id)
    .execute(&mut *tx)
    .await?;

    if let Some(class_ids) = &changes.class_ids {
        sync_teacher_classes(&mut *tx, teacher_id, class_ids).await?;
    }

    tx.commit().await?;

    Ok(())
}

/// Removes the teacher's class links and then the teacher itself.
#[instrument]
pub async fn delete_teacher(pool: &Pool<Sqlite>, id: &str) -> Result<u64, AppError> {
    info!("Deleting teacher");
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM classes_teachers WHERE teacher_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let res = sqlx::query("DELETE FROM teachers WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(res.rows_affected())
}
