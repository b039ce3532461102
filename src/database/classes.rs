use std::collections::HashMap;

use sqlx::{Pool, QueryBuilder, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{Class, DbTeacherClass};

#[instrument]
pub async fn create_class(pool: &Pool<Sqlite>, name: &str) -> Result<i64, AppError> {
    info!("Creating class");
    let res = sqlx::query("INSERT INTO classes (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?;

    Ok(res.last_insert_rowid())
}

/// Loads the classes of every listed teacher in one query.
/// Teachers without classes are absent from the map.
#[instrument(skip(pool))]
pub async fn get_classes_for_teachers(
    pool: &Pool<Sqlite>,
    teacher_ids: &[i64],
) -> Result<HashMap<i64, Vec<Class>>, AppError> {
    let mut classes: HashMap<i64, Vec<Class>> = HashMap::new();

    if teacher_ids.is_empty() {
        return Ok(classes);
    }

    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT ct.teacher_id AS teacher_id, c.id AS class_id, c.name AS class_name
         FROM classes_teachers ct
         JOIN classes c ON c.id = ct.class_id
         WHERE ct.teacher_id IN (",
    );
    let mut separated = query.separated(", ");
    for id in teacher_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY ct.teacher_id, c.id");

    let rows = query
        .build_query_as::<DbTeacherClass>()
        .fetch_all(pool)
        .await?;

    for row in rows {
        classes.entry(row.teacher_id).or_default().push(Class {
            id: row.class_id,
            name: row.class_name,
        });
    }

    Ok(classes)
}
