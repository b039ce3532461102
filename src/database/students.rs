use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{DbStudent, NewStudent, Student, StudentChanges};

const SELECT_STUDENTS: &str = "SELECT s.id, s.name, s.surname, c.id AS class_id, c.name AS class_name
     FROM students s
     LEFT JOIN classes c ON c.id = s.class";

#[instrument]
pub async fn get_all_students(pool: &Pool<Sqlite>) -> Result<Vec<Student>, AppError> {
    info!("Getting all students");
    let rows = sqlx::query_as::<_, DbStudent>(&format!("{} ORDER BY s.id", SELECT_STUDENTS))
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Student::from).collect())
}

#[instrument]
pub async fn get_students_by_class(
    pool: &Pool<Sqlite>,
    class_id: &str,
) -> Result<Vec<Student>, AppError> {
    info!("Getting students by class");
    let rows = sqlx::query_as::<_, DbStudent>(&format!(
        "{} WHERE s.class = ? ORDER BY s.id",
        SELECT_STUDENTS
    ))
    .bind(class_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Student::from).collect())
}

#[instrument]
pub async fn get_student(pool: &Pool<Sqlite>, id: &str) -> Result<Student, AppError> {
    info!("Fetching student by ID");
    let row = sqlx::query_as::<_, DbStudent>(&format!("{} WHERE s.id = ?", SELECT_STUDENTS))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(student) => Ok(Student::from(student)),
        _ => Err(AppError::not_found("Student", id)),
    }
}

#[instrument]
pub async fn create_student(pool: &Pool<Sqlite>, student: &NewStudent) -> Result<i64, AppError> {
    info!("Creating student");
    let res = sqlx::query("INSERT INTO students (name, surname, class) VALUES (?, ?, ?)")
        .bind(&student.name)
        .bind(&student.surname)
        .bind(student.class_id)
        .execute(pool)
        .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn update_student(
    pool: &Pool<Sqlite>,
    id: &str,
    changes: &StudentChanges,
) -> Result<(), AppError> {
    info!("Updating student");
    let res = sqlx::query(
        "UPDATE students
         SET name = COALESCE(?, name), surname = COALESCE(?, surname), class = COALESCE(?, class)
         WHERE id = ?",
    )
    .bind(&changes.name)
    .bind(&changes.surname)
    .bind(changes.class_id)
    .bind(id)
    .execute(pool)
    .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::not_found("Student", id));
    }

    Ok(())
}

/// Returns the number of rows removed; zero is not an error.
#[instrument]
pub async fn delete_student(pool: &Pool<Sqlite>, id: &str) -> Result<u64, AppError> {
    info!("Deleting student");
    let res = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(res.rows_affected())
}
