use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::database::get_classes_for_teachers;
use crate::error::AppError;
use crate::models::{DbObservation, NewObservation, Observation, ObservationChanges};

const SELECT_OBSERVATIONS: &str = "SELECT
        o.id, o.achieved, o.date,
        t.id AS teacher_id, t.name AS teacher_name, t.surname AS teacher_surname,
        s.id AS student_id, s.name AS student_name, s.surname AS student_surname,
        sc.id AS student_class_id, sc.name AS student_class_name,
        r.id AS remark_id, r.skill AS remark_skill, r.level AS remark_level,
        r.description AS remark_description
     FROM observations o
     JOIN teachers t ON t.id = o.teacher
     JOIN students s ON s.id = o.student
     LEFT JOIN classes sc ON sc.id = s.class
     JOIN remarks r ON r.id = o.remark";

/// Attaches each teacher's classes with a single batch lookup.
async fn hydrate(
    pool: &Pool<Sqlite>,
    rows: Vec<DbObservation>,
) -> Result<Vec<Observation>, AppError> {
    let mut teacher_ids: Vec<i64> = rows.iter().map(|row| row.teacher_id).collect();
    teacher_ids.sort_unstable();
    teacher_ids.dedup();

    let classes = get_classes_for_teachers(pool, &teacher_ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let teacher_classes = classes.get(&row.teacher_id).cloned().unwrap_or_default();
            row.into_observation(teacher_classes)
        })
        .collect())
}

#[instrument]
pub async fn get_all_observations(pool: &Pool<Sqlite>) -> Result<Vec<Observation>, AppError> {
    info!("Getting all observations");
    let rows = sqlx::query_as::<_, DbObservation>(&format!("{} ORDER BY o.id", SELECT_OBSERVATIONS))
        .fetch_all(pool)
        .await?;

    hydrate(pool, rows).await
}

#[instrument]
pub async fn get_observations_by_student(
    pool: &Pool<Sqlite>,
    student_id: &str,
) -> Result<Vec<Observation>, AppError> {
    info!("Getting observations by student");
    let rows = sqlx::query_as::<_, DbObservation>(&format!(
        "{} WHERE o.student = ? ORDER BY o.id",
        SELECT_OBSERVATIONS
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    hydrate(pool, rows).await
}

#[instrument]
pub async fn get_observations_by_teacher(
    pool: &Pool<Sqlite>,
    teacher_id: &str,
) -> Result<Vec<Observation>, AppError> {
    info!("Getting observations by teacher");
    let rows = sqlx::query_as::<_, DbObservation>(&format!(
        "{} WHERE o.teacher = ? ORDER BY o.id",
        SELECT_OBSERVATIONS
    ))
    .bind(teacher_id)
    .fetch_all(pool)
    .await?;

    hydrate(pool, rows).await
}

#[instrument]
pub async fn get_observations_by_teacher_and_student(
    pool: &Pool<Sqlite>,
    teacher_id: &str,
    student_id: &str,
) -> Result<Vec<Observation>, AppError> {
    info!("Getting observations by teacher and student");
    let rows = sqlx::query_as::<_, DbObservation>(&format!(
        "{} WHERE o.teacher = ? AND o.student = ? ORDER BY o.id",
        SELECT_OBSERVATIONS
    ))
    .bind(teacher_id)
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    hydrate(pool, rows).await
}

#[instrument]
pub async fn get_observation(pool: &Pool<Sqlite>, id: &str) -> Result<Observation, AppError> {
    info!("Fetching observation by ID");
    let row = sqlx::query_as::<_, DbObservation>(&format!("{} WHERE o.id = ?", SELECT_OBSERVATIONS))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("Observation", id))?;

    hydrate(pool, vec![row])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Observation", id))
}

#[instrument]
pub async fn create_observation(
    pool: &Pool<Sqlite>,
    observation: &NewObservation,
) -> Result<i64, AppError> {
    info!("Creating observation");
    let res = sqlx::query(
        "INSERT INTO observations (teacher, student, remark, achieved, date)
         VALUES (?, ?, ?, ?, COALESCE(?, CURRENT_TIMESTAMP))",
    )
    .bind(observation.teacher_id)
    .bind(observation.student_id)
    .bind(observation.remark_id)
    .bind(observation.achieved)
    .bind(observation.date)
    .execute(pool)
    .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn update_observation(
    pool: &Pool<Sqlite>,
    id: &str,
    changes: &ObservationChanges,
) -> Result<(), AppError> {
    info!("Updating observation");
    let res = sqlx::query(
        "UPDATE observations
         SET teacher = COALESCE(?, teacher),
             student = COALESCE(?, student),
             remark = COALESCE(?, remark),
             achieved = COALESCE(?, achieved),
             date = COALESCE(?, date)
         WHERE id = ?",
    )
    .bind(changes.teacher_id)
    .bind(changes.student_id)
    .bind(changes.remark_id)
    .bind(changes.achieved)
    .bind(changes.date)
    .bind(id)
    .execute(pool)
    .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::not_found("Observation", id));
    }

    Ok(())
}

#[instrument]
pub async fn delete_observation(pool: &Pool<Sqlite>, id: &str) -> Result<u64, AppError> {
    info!("Deleting observation");
    let res = sqlx::query("DELETE FROM observations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(res.rows_affected())
}
