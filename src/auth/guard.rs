use rocket::Request;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use sqlx::SqlitePool;

use crate::database::verify_credentials;

use super::BasicCredentials;

/// Request guard for every `/api` route. Resolves only when the Basic-Auth
/// header matches a stored credential; otherwise the request ends in a 401
/// and the handler never runs.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub username: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Authenticated {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(credentials) = request
            .headers()
            .get_one("Authorization")
            .and_then(BasicCredentials::from_header)
        else {
            tracing::warn!("Missing or malformed Basic-Auth header");
            return Outcome::Error((Status::Unauthorized, ()));
        };

        let db = match request.rocket().state::<SqlitePool>() {
            Some(pool) => pool,
            _ => {
                tracing::error!("Database pool not found in managed state");
                return Outcome::Error((Status::InternalServerError, ()));
            }
        };

        match verify_credentials(db, &credentials.username, &credentials.password).await {
            Ok(true) => {
                tracing::debug!(username = %credentials.username, "Request authenticated");
                Outcome::Success(Authenticated {
                    username: credentials.username,
                })
            }
            Ok(false) => {
                tracing::warn!(username = %credentials.username, "Rejected credentials");
                Outcome::Error((Status::Unauthorized, ()))
            }
            Err(err) => Outcome::Error((err.to_status_with_log("Credential lookup"), ())),
        }
    }
}
