use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;

pub const CURRENT_SCHEMA: &str = r#"
PRAGMA foreign_keys = 1;

CREATE TABLE IF NOT EXISTS classes (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    surname TEXT NOT NULL,
    class INTEGER,
    FOREIGN KEY (class) REFERENCES classes (id)
);

CREATE TABLE IF NOT EXISTS teachers (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    surname TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS classes_teachers (
    teacher_id INTEGER NOT NULL,
    class_id INTEGER NOT NULL,
    PRIMARY KEY (teacher_id, class_id),
    FOREIGN KEY (teacher_id) REFERENCES teachers (id),
    FOREIGN KEY (class_id) REFERENCES classes (id)
);

CREATE TABLE IF NOT EXISTS remarks (
    id INTEGER PRIMARY KEY,
    skill TEXT NOT NULL,
    level INTEGER NOT NULL DEFAULT 0,
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS observations (
    id INTEGER PRIMARY KEY,
    teacher INTEGER NOT NULL,
    student INTEGER NOT NULL,
    remark INTEGER NOT NULL,
    achieved BOOLEAN NOT NULL DEFAULT FALSE,
    date TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (teacher) REFERENCES teachers (id),
    FOREIGN KEY (student) REFERENCES students (id),
    FOREIGN KEY (remark) REFERENCES remarks (id)
);

CREATE INDEX IF NOT EXISTS idx_students_class ON students (class);
CREATE INDEX IF NOT EXISTS idx_observations_teacher ON observations (teacher);
CREATE INDEX IF NOT EXISTS idx_observations_student ON observations (student);

CREATE TABLE IF NOT EXISTS credentials (
    username TEXT PRIMARY KEY,
    password_hash TEXT NOT NULL
);
"#;

/// Creates any missing tables. Existing tables are left untouched.
#[instrument(skip(pool))]
pub async fn apply_schema(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    info!("Ensuring database schema");
    sqlx::raw_sql(CURRENT_SCHEMA).execute(pool).await?;
    Ok(())
}
