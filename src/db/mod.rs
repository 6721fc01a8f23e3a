pub mod messages;
pub mod models;
pub mod users;

pub use messages::MessageRepository;
pub use models::{Message, User};
pub use users::{NewUser, UserRepository};

use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

use crate::config::Config;
use crate::error::AppError;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Open the connection pool, retrying a bounded number of times before
/// giving up. Retries exist only here at startup, never per-request.
pub async fn connect(config: &Config) -> Result<Pool<Sqlite>, AppError> {
    let mut attempt = 1;

    loop {
        let result = SqlitePoolOptions::new()
            .max_connections(config.db_max_connections)
            .min_connections(config.db_min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(&config.database_url)
            .await;

        match result {
            Ok(pool) => return Ok(pool),
            Err(err) if attempt < CONNECT_ATTEMPTS => {
                tracing::warn!(
                    "database connection attempt {}/{} failed: {}, retrying in {:?}",
                    attempt,
                    CONNECT_ATTEMPTS,
                    err,
                    CONNECT_RETRY_DELAY
                );
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                attempt += 1;
            }
            Err(err) => return Err(AppError::Database(err)),
        }
    }
}
