use rocket::State;
use rocket::form::Form;
use rocket::http::Status;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::api::form::{non_empty, parse_int, require};
use crate::auth::Authenticated;
use crate::database::{
    create_student, delete_student, get_all_students, get_student, get_students_by_class,
    update_student,
};
use crate::error::AppError;
use crate::models::{NewStudent, Student, StudentChanges};

#[derive(Debug, FromForm, Validate)]
pub struct StudentForm {
    #[validate(length(max = 100, message = "Name is too long"))]
    pub name: Option<String>,
    #[validate(length(max = 100, message = "Surname is too long"))]
    pub surname: Option<String>,
    pub class: Option<String>,
}

impl StudentForm {
    pub fn into_new_student(self) -> Result<NewStudent, AppError> {
        self.validate()?;

        Ok(NewStudent {
            class_id: parse_int("class", self.class.as_deref())?,
            name: require("name", non_empty(self.name))?,
            surname: require("surname", non_empty(self.surname))?,
        })
    }

    pub fn into_changes(self) -> Result<StudentChanges, AppError> {
        self.validate()?;

        Ok(StudentChanges {
            class_id: parse_int("class", self.class.as_deref())?,
            name: non_empty(self.name),
            surname: non_empty(self.surname),
        })
    }
}

#[get("/students")]
pub async fn api_get_students(
    _user: Authenticated,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Student>>, AppError> {
    Ok(Json(get_all_students(db).await?))
}

#[post("/students", data = "<form>")]
pub async fn api_create_student(
    _user: Authenticated,
    form: Form<StudentForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<i64>, AppError> {
    let student = form.into_inner().into_new_student()?;
    Ok(Json(create_student(db, &student).await?))
}

#[get("/students/<id>")]
pub async fn api_get_student(
    id: &str,
    _user: Authenticated,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Student>, AppError> {
    Ok(Json(get_student(db, id).await?))
}

#[patch("/students/<id>", data = "<form>")]
pub async fn api_update_student(
    id: &str,
    _user: Authenticated,
    form: Form<StudentForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    let changes = form.into_inner().into_changes()?;
    update_student(db, id, &changes).await?;
    Ok(Status::Ok)
}

#[delete("/students/<id>")]
pub async fn api_delete_student(
    id: &str,
    _user: Authenticated,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    delete_student(db, id).await?;
    Ok(Status::Ok)
}

#[get("/students/class/<id>")]
pub async fn api_get_students_by_class(
    id: &str,
    _user: Authenticated,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Student>>, AppError> {
    Ok(Json(get_students_by_class(db, id).await?))
}
