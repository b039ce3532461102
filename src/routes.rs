use rocket::http::{Header, Method, Status};
use rocket::{Catcher, Request, Route};

use crate::api::*;
use crate::cors::preflight;
use crate::error::AppError;

/// Every path the service answers and the methods it accepts there.
/// `OPTIONS` is served everywhere by the preflight route and is not listed.
pub const ROUTE_TABLE: &[(&str, &[Method])] = &[
    ("/status", &[Method::Get]),
    ("/api/students", &[Method::Get, Method::Post]),
    ("/api/students/<id>", &[Method::Get, Method::Patch, Method::Delete]),
    ("/api/students/class/<id>", &[Method::Get]),
    ("/api/teachers", &[Method::Get, Method::Post]),
    ("/api/teachers/<id>", &[Method::Get, Method::Patch, Method::Delete]),
    ("/api/remarks", &[Method::Get, Method::Post]),
    ("/api/remarks/<id>", &[Method::Get, Method::Patch, Method::Delete]),
    ("/api/observations", &[Method::Get, Method::Post]),
    ("/api/observations/<id>", &[Method::Get, Method::Patch, Method::Delete]),
    ("/api/observations/student/<id>", &[Method::Get]),
    ("/api/observations/teacher/<id>", &[Method::Get]),
    (
        "/api/observations/teacher/<teacher_id>/student/<student_id>",
        &[Method::Get],
    ),
];

pub fn api_routes() -> Vec<Route> {
    routes![
        api_get_students,
        api_create_student,
        api_get_student,
        api_update_student,
        api_delete_student,
        api_get_students_by_class,
        api_get_teachers,
        api_create_teacher,
        api_get_teacher,
        api_update_teacher,
        api_delete_teacher,
        api_get_remarks,
        api_create_remark,
        api_get_remark,
        api_update_remark,
        api_delete_remark,
        api_get_observations,
        api_create_observation,
        api_get_observation,
        api_update_observation,
        api_delete_observation,
        api_get_observations_by_student,
        api_get_observations_by_teacher,
        api_get_observations_by_teacher_and_student,
    ]
}

pub fn public_routes() -> Vec<Route> {
    routes![health, preflight]
}

pub fn catchers() -> Vec<Catcher> {
    catchers![
        unauthorized,
        not_found,
        unsupported_media_type,
        unprocessable,
        default_catcher
    ]
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

pub(crate) fn pattern_matches(pattern: &str, path: &str) -> bool {
    let mut pattern_segments = segments(pattern);
    let mut path_segments = segments(path);

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(expected), Some(actual)) => {
                let dynamic = expected.starts_with('<') && expected.ends_with('>');
                if !dynamic && expected != actual {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

/// Methods accepted on `path`, or `None` when no route pattern matches it.
pub fn allowed_methods(path: &str) -> Option<Vec<Method>> {
    let mut allowed: Vec<Method> = ROUTE_TABLE
        .iter()
        .filter(|(pattern, _)| pattern_matches(pattern, path))
        .flat_map(|(_, methods)| methods.iter().copied())
        .collect();

    if allowed.is_empty() {
        return None;
    }

    allowed.dedup();
    allowed.push(Method::Options);
    Some(allowed)
}

#[derive(Responder)]
#[response(status = 405, content_type = "plain")]
pub struct MethodNotAllowed {
    body: String,
    allow: Header<'static>,
}

#[catch(401)]
pub fn unauthorized(_req: &Request) -> AppError {
    AppError::Authentication("Authentication failed, you shall not pass".to_string())
}

/// Rocket reports a known path hit with the wrong method as a 404; this
/// turns those into a 405 with an `Allow` header.
#[catch(404)]
pub fn not_found(req: &Request) -> Result<MethodNotAllowed, AppError> {
    let path = req.uri().path().to_string();

    match allowed_methods(&path) {
        Some(methods) => {
            let allow = methods
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ");

            Ok(MethodNotAllowed {
                body: format!("Method {} not allowed on {}", req.method(), path),
                allow: Header::new("Allow", allow),
            })
        }
        None => Err(AppError::NotFound(format!("No route for {}", path))),
    }
}

/// Form routes forward bodies that are missing or not urlencoded with a 415.
#[catch(415)]
pub fn unsupported_media_type(req: &Request) -> AppError {
    let received = req
        .content_type()
        .map(|ct| ct.to_string())
        .unwrap_or_else(|| "no body".to_string());

    AppError::Validation(format!(
        "Expected an application/x-www-form-urlencoded body, got {}",
        received
    ))
}

/// Form fields that fail to decode surface as a 422; report them as 400.
#[catch(422)]
pub fn unprocessable(_req: &Request) -> AppError {
    AppError::Validation("Malformed form data".to_string())
}

#[catch(default)]
pub fn default_catcher(status: Status, _req: &Request) -> (Status, String) {
    let reason = status.reason().unwrap_or("Error");
    (status, reason.to_string())
}
