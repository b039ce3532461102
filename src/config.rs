use std::path::Path;

use rocket::figment::Figment;
use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://database.db?mode=rwc";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_AUTH_REALM: &str = "Svalutation";

/// Application settings read from `Rocket.toml` and `ROCKET_*` variables.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_cors_allow_origin")]
    pub cors_allow_origin: String,
    #[serde(default = "default_auth_realm")]
    pub auth_realm: String,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

fn default_cors_allow_origin() -> String {
    DEFAULT_CORS_ORIGIN.to_string()
}

fn default_auth_realm() -> String {
    DEFAULT_AUTH_REALM.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            cors_allow_origin: default_cors_allow_origin(),
            auth_realm: default_auth_realm(),
        }
    }
}

impl AppConfig {
    pub fn from_figment() -> Result<Self, crate::Error> {
        Self::extract(&rocket::Config::figment())
    }

    pub fn extract(figment: &Figment) -> Result<Self, crate::Error> {
        Ok(figment.extract::<AppConfig>()?)
    }
}

pub type EnvError = Box<dyn std::error::Error + Send + Sync>;

pub fn load_environment() -> Result<(), EnvError> {
    let is_production =
        dotenvy::var("ROCKET_PROFILE").unwrap_or("development".to_string()) == "production";

    let env_files = if is_production {
        vec!["config/common.env", "config/prod.env", ".secrets.env"]
    } else {
        vec!["config/common.env", "config/dev.env", ".secrets.env"]
    };

    for env_file in env_files {
        load_env_file(env_file)?;
    }

    Ok(())
}

fn load_env_file(path: &str) -> Result<(), EnvError> {
    if !Path::new(path).exists() {
        warn!("Warning: Environment file {} not found, skipping", path);
        return Ok(());
    }

    dotenvy::from_filename_override(path)?;
    info!("Loaded environment from: {}", path);
    Ok(())
}
