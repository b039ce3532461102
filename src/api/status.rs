use rocket::http::Status;

/// Liveness probe; no authentication, no body.
#[get("/status")]
pub fn health() -> Status {
    Status::NoContent
}
