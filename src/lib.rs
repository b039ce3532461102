#[macro_use]
extern crate rocket;

pub mod api;
pub mod auth;
pub mod config;
pub mod cors;
pub mod database;
pub mod error;
pub mod models;
pub mod routes;
pub mod telemetry;
#[cfg(test)]
mod test;

use std::sync::Mutex;

use config::AppConfig;
use cors::CorsFairing;
use error::AppError;
use once_cell::sync::Lazy;
use rocket::fairing::AdHoc;
use rocket::{Build, Rocket};
use sqlx::SqlitePool;
use telemetry::{OtelGuard, TelemetryFairing};
use thiserror::Error;
use tracing::info;

pub static TELEMETRY_GUARD: Lazy<Mutex<Option<OtelGuard>>> = Lazy::new(|| Mutex::new(None));

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Figment(rocket::figment::Error),
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

impl From<rocket::figment::Error> for Error {
    fn from(value: rocket::figment::Error) -> Self {
        Error::Figment(value)
    }
}

pub fn init_rocket(pool: SqlitePool, config: AppConfig) -> Rocket<Build> {
    info!("Starting observation tracker");

    let shutdown_pool = pool.clone();

    rocket::build()
        .manage(pool)
        .manage(config)
        .mount("/api", routes::api_routes())
        .mount("/", routes::public_routes())
        .register("/", routes::catchers())
        .attach(TelemetryFairing)
        .attach(CorsFairing)
        .attach(AdHoc::on_shutdown("Close database pool", |_| {
            Box::pin(async move {
                info!("Closing database pool");
                shutdown_pool.close().await;
                telemetry::shutdown_telemetry();
            })
        }))
}
