use rocket::State;
use rocket::form::Form;
use rocket::http::Status;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::api::form::{non_empty, parse_int, require};
use crate::auth::Authenticated;
use crate::database::{create_remark, delete_remark, get_all_remarks, get_remark, update_remark};
use crate::error::AppError;
use crate::models::{NewRemark, Remark, RemarkChanges};

#[derive(Debug, FromForm, Validate)]
pub struct RemarkForm {
    #[validate(length(max = 100, message = "Skill is too long"))]
    pub skill: Option<String>,
    pub level: Option<String>,
    #[validate(length(max = 2000, message = "Description is too long"))]
    pub description: Option<String>,
}

impl RemarkForm {
    pub fn into_new_remark(self) -> Result<NewRemark, AppError> {
        self.validate()?;

        Ok(NewRemark {
            level: require("level", parse_int("level", self.level.as_deref())?)?,
            skill: require("skill", non_empty(self.skill))?,
            description: non_empty(self.description).unwrap_or_default(),
        })
    }

    pub fn into_changes(self) -> Result<RemarkChanges, AppError> {
        self.validate()?;

        Ok(RemarkChanges {
            level: parse_int("level", self.level.as_deref())?,
            skill: non_empty(self.skill),
            description: non_empty(self.description),
        })
    }
}

#[get("/remarks")]
pub async fn api_get_remarks(
    _user: Authenticated,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Remark>>, AppError> {
    Ok(Json(get_all_remarks(db).await?))
}

#[post("/remarks", data = "<form>")]
pub async fn api_create_remark(
    _user: Authenticated,
    form: Form<RemarkForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<i64>, AppError> {
    let remark = form.into_inner().into_new_remark()?;
    Ok(Json(create_remark(db, &remark).await?))
}

#[get("/remarks/<id>")]
pub async fn api_get_remark(
    id: &str,
    _user: Authenticated,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Remark>, AppError> {
    Ok(Json(get_remark(db, id).await?))
}

#[patch("/remarks/<id>", data = "<form>")]
pub async fn api_update_remark(
    id: &str,
    _user: Authenticated,
    form: Form<RemarkForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    let changes = form.into_inner().into_changes()?;
    update_remark(db, id, &changes).await?;
    Ok(Status::Ok)
}

#[delete("/remarks/<id>")]
pub async fn api_delete_remark(
    id: &str,
    _user: Authenticated,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    delete_remark(db, id).await?;
    Ok(Status::Ok)
}
