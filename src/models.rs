use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Class {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub class: Option<Class>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub classes: Vec<Class>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Remark {
    pub id: i64,
    pub skill: String,
    pub level: i64,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Observation {
    pub id: i64,
    pub teacher: Teacher,
    pub student: Student,
    pub remark: Remark,
    pub achieved: bool,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub surname: String,
    pub class_id: Option<i64>,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct StudentChanges {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub class_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewTeacher {
    pub name: String,
    pub surname: String,
    pub class_ids: Vec<i64>,
}

/// `class_ids: Some(..)` replaces the whole class set.
#[derive(Debug, Clone, Default)]
pub struct TeacherChanges {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub class_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone)]
pub struct NewRemark {
    pub skill: String,
    pub level: i64,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct RemarkChanges {
    pub skill: Option<String>,
    pub level: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewObservation {
    pub teacher_id: i64,
    pub student_id: i64,
    pub remark_id: i64,
    pub achieved: bool,
    pub date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default)]
pub struct ObservationChanges {
    pub teacher_id: Option<i64>,
    pub student_id: Option<i64>,
    pub remark_id: Option<i64>,
    pub achieved: Option<bool>,
    pub date: Option<NaiveDateTime>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbStudent {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub class_id: Option<i64>,
    pub class_name: Option<String>,
}

impl From<DbStudent> for Student {
    fn from(row: DbStudent) -> Self {
        let class = match (row.class_id, row.class_name) {
            (Some(id), Some(name)) => Some(Class { id, name }),
            _ => None,
        };

        Self {
            id: row.id,
            name: row.name,
            surname: row.surname,
            class,
        }
    }
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbTeacher {
    pub id: i64,
    pub name: String,
    pub surname: String,
}

impl DbTeacher {
    pub fn with_classes(self, classes: Vec<Class>) -> Teacher {
        Teacher {
            id: self.id,
            name: self.name,
            surname: self.surname,
            classes,
        }
    }
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbTeacherClass {
    pub teacher_id: i64,
    pub class_id: i64,
    pub class_name: String,
}

/// One observation joined with its teacher, student (and class) and remark.
#[derive(sqlx::FromRow, Clone)]
pub struct DbObservation {
    pub id: i64,
    pub achieved: bool,
    pub date: NaiveDateTime,
    pub teacher_id: i64,
    pub teacher_name: String,
    pub teacher_surname: String,
    pub student_id: i64,
    pub student_name: String,
    pub student_surname: String,
    pub student_class_id: Option<i64>,
    pub student_class_name: Option<String>,
    pub remark_id: i64,
    pub remark_skill: String,
    pub remark_level: i64,
    pub remark_description: String,
}

impl DbObservation {
    pub fn into_observation(self, teacher_classes: Vec<Class>) -> Observation {
        let student = Student::from(DbStudent {
            id: self.student_id,
            name: self.student_name,
            surname: self.student_surname,
            class_id: self.student_class_id,
            class_name: self.student_class_name,
        });

        Observation {
            id: self.id,
            teacher: Teacher {
                id: self.teacher_id,
                name: self.teacher_name,
                surname: self.teacher_surname,
                classes: teacher_classes,
            },
            student,
            remark: Remark {
                id: self.remark_id,
                skill: self.remark_skill,
                level: self.remark_level,
                description: self.remark_description,
            },
            achieved: self.achieved,
            date: DateTime::<Utc>::from_naive_utc_and_offset(self.date, Utc),
        }
    }
}
