use observation_tracker::config::{AppConfig, load_environment};
use observation_tracker::database::{apply_schema, store_credential};
use sqlx::SqlitePool;

const USAGE: &str = "usage: create_credential <username> [password]
  the password may also be supplied through CREDENTIAL_PASSWORD";

#[tokio::main]
async fn main() -> Result<(), observation_tracker::Error> {
    if let Err(e) = load_environment() {
        eprintln!("Failed to load environment files: {}", e);
    }

    let mut args = std::env::args().skip(1);

    let Some(username) = args.next() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let Some(password) = args
        .next()
        .or_else(|| std::env::var("CREDENTIAL_PASSWORD").ok())
        .filter(|p| !p.is_empty())
    else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let config = AppConfig::from_figment()?;
    let pool = SqlitePool::connect(&config.database_url).await?;

    apply_schema(&pool).await?;
    store_credential(&pool, &username, &password, bcrypt::DEFAULT_COST).await?;

    println!("Stored credential for {} ✓", username);
    pool.close().await;

    Ok(())
}
