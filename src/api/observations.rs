use rocket::State;
use rocket::form::Form;
use rocket::http::Status;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};

use crate::api::form::{parse_bool, parse_date, parse_int, require};
use crate::auth::Authenticated;
use crate::database::{
    create_observation, delete_observation, get_all_observations, get_observation,
    get_observations_by_student, get_observations_by_teacher,
    get_observations_by_teacher_and_student, update_observation,
};
use crate::error::AppError;
use crate::models::{NewObservation, Observation, ObservationChanges};

#[derive(Debug, FromForm)]
pub struct ObservationForm {
    pub teacher: Option<String>,
    pub student: Option<String>,
    pub remark: Option<String>,
    pub achieved: Option<String>,
    pub date: Option<String>,
}

impl ObservationForm {
    pub fn into_new_observation(self) -> Result<NewObservation, AppError> {
        Ok(NewObservation {
            teacher_id: require("teacher", parse_int("teacher", self.teacher.as_deref())?)?,
            student_id: require("student", parse_int("student", self.student.as_deref())?)?,
            remark_id: require("remark", parse_int("remark", self.remark.as_deref())?)?,
            achieved: parse_bool("achieved", self.achieved.as_deref())?.unwrap_or(false),
            date: parse_date("date", self.date.as_deref())?,
        })
    }

    pub fn into_changes(self) -> Result<ObservationChanges, AppError> {
        Ok(ObservationChanges {
            teacher_id: parse_int("teacher", self.teacher.as_deref())?,
            student_id: parse_int("student", self.student.as_deref())?,
            remark_id: parse_int("remark", self.remark.as_deref())?,
            achieved: parse_bool("achieved", self.achieved.as_deref())?,
            date: parse_date("date", self.date.as_deref())?,
        })
    }
}

#[get("/observations")]
pub async fn api_get_observations(
    _user: Authenticated,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Observation>>, AppError> {
    Ok(Json(get_all_observations(db).await?))
}

#[post("/observations", data = "<form>")]
pub async fn api_create_observation(
    _user: Authenticated,
    form: Form<ObservationForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<i64>, AppError> {
    let observation = form.into_inner().into_new_observation()?;
    Ok(Json(create_observation(db, &observation).await?))
}

#[get("/observations/<id>")]
pub async fn api_get_observation(
    id: &str,
    _user: Authenticated,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Observation>, AppError> {
    Ok(Json(get_observation(db, id).await?))
}

#[patch("/observations/<id>", data = "<form>")]
pub async fn api_update_observation(
    id: &str,
    _user: Authenticated,
    form: Form<ObservationForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    let changes = form.into_inner().into_changes()?;
    update_observation(db, id, &changes).await?;
    Ok(Status::Ok)
}

#[delete("/observations/<id>")]
pub async fn api_delete_observation(
    id: &str,
    _user: Authenticated,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    delete_observation(db, id).await?;
    Ok(Status::Ok)
}

#[get("/observations/student/<id>")]
pub async fn api_get_observations_by_student(
    id: &str,
    _user: Authenticated,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Observation>>, AppError> {
    Ok(Json(get_observations_by_student(db, id).await?))
}

#[get("/observations/teacher/<id>")]
pub async fn api_get_observations_by_teacher(
    id: &str,
    _user: Authenticated,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Observation>>, AppError> {
    Ok(Json(get_observations_by_teacher(db, id).await?))
}

#[get("/observations/teacher/<teacher_id>/student/<student_id>")]
pub async fn api_get_observations_by_teacher_and_student(
    teacher_id: &str,
    student_id: &str,
    _user: Authenticated,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Observation>>, AppError> {
    Ok(Json(
        get_observations_by_teacher_and_student(db, teacher_id, student_id).await?,
    ))
}
