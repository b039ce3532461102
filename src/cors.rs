use rocket::http::{Header, Status};
use rocket::{
    Request, Response,
    fairing::{Fairing, Info, Kind},
};

use crate::config::{AppConfig, DEFAULT_CORS_ORIGIN};

pub const ALLOWED_METHODS: &str = "GET, POST, PATCH, DELETE, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Origin, Content-Type, Accept, Authorization";

/// Adds the fixed CORS headers to every response, error responses included.
pub struct CorsFairing;

#[rocket::async_trait]
impl Fairing for CorsFairing {
    fn info(&self) -> Info {
        Info {
            name: "CORS headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let origin = request
            .rocket()
            .state::<AppConfig>()
            .map(|config| config.cors_allow_origin.clone())
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        response.set_header(Header::new("Access-Control-Allow-Origin", origin));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
        response.set_header(Header::new("Access-Control-Allow-Methods", ALLOWED_METHODS));
        response.set_header(Header::new("Access-Control-Allow-Headers", ALLOWED_HEADERS));
    }
}

/// Preflight requests skip authentication and get an empty 200.
#[options("/<_..>")]
pub fn preflight() -> Status {
    Status::Ok
}
