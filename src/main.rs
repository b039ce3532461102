use observation_tracker::config::{AppConfig, load_environment};
use observation_tracker::database::apply_schema;
use observation_tracker::init_rocket;
use observation_tracker::telemetry::init_tracing;
use rocket::{Build, Rocket, launch};
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{error, info};

#[launch]
async fn rocket() -> Rocket<Build> {
    let env_error = load_environment().err().map(|e| e.to_string());

    init_tracing();

    if let Some(e) = env_error {
        error!("Failed to load environment files: {}", e);
    }

    let config = match AppConfig::from_figment() {
        Ok(config) => config,
        Err(e) => panic!("Invalid configuration: {}", e),
    };

    let pool = match SqlitePoolOptions::new().connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => panic!("Failed to connect to SQLite database: {}", e),
    };

    info!("Applying database schema...");
    match apply_schema(&pool).await {
        Ok(_) => info!("Database schema ready"),
        Err(e) => {
            error!("Failed to apply schema: {}", e);
            panic!("Database schema setup failed: {}", e);
        }
    }

    init_rocket(pool, config)
}
