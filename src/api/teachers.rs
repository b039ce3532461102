use rocket::State;
use rocket::form::Form;
use rocket::http::Status;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::api::form::{non_empty, parse_id_list, require};
use crate::auth::Authenticated;
use crate::database::{create_teacher, delete_teacher, get_all_teachers, get_teacher, update_teacher};
use crate::error::AppError;
use crate::models::{NewTeacher, Teacher, TeacherChanges};

/// `classes` carries a JSON array of class ids, e.g. `classes=[1,2]`.
#[derive(Debug, FromForm, Validate)]
pub struct TeacherForm {
    #[validate(length(max = 100, message = "Name is too long"))]
    pub name: Option<String>,
    #[validate(length(max = 100, message = "Surname is too long"))]
    pub surname: Option<String>,
    pub classes: Option<String>,
}

impl TeacherForm {
    pub fn into_new_teacher(self) -> Result<NewTeacher, AppError> {
        self.validate()?;

        Ok(NewTeacher {
            class_ids: parse_id_list("classes", self.classes.as_deref())?.unwrap_or_default(),
            name: require("name", non_empty(self.name))?,
            surname: require("surname", non_empty(self.surname))?,
        })
    }

    pub fn into_changes(self) -> Result<TeacherChanges, AppError> {
        self.validate()?;

        Ok(TeacherChanges {
            class_ids: parse_id_list("classes", self.classes.as_deref())?,
            name: non_empty(self.name),
            surname: non_empty(self.surname),
        })
    }
}

#[get("/teachers")]
pub async fn api_get_teachers(
    _user: Authenticated,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Teacher>>, AppError> {
    Ok(Json(get_all_teachers(db).await?))
}

#[post("/teachers", data = "<form>")]
pub async fn api_create_teacher(
    _user: Authenticated,
    form: Form<TeacherForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<i64>, AppError> {
    let teacher = form.into_inner().into_new_teacher()?;
    Ok(Json(create_teacher(db, &teacher).await?))
}

#[get("/teachers/<id>")]
pub async fn api_get_teacher(
    id: &str,
    _user: Authenticated,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Teacher>, AppError> {
    Ok(Json(get_teacher(db, id).await?))
}

#[patch("/teachers/<id>", data = "<form>")]
pub async fn api_update_teacher(
    id: &str,
    _user: Authenticated,
    form: Form<TeacherForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    let changes = form.into_inner().into_changes()?;
    update_teacher(db, id, &changes).await?;
    Ok(Status::Ok)
}

#[delete("/teachers/<id>")]
pub async fn api_delete_teacher(
    id: &str,
    _user: Authenticated,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    delete_teacher(db, id).await?;
    Ok(Status::Ok)
}
