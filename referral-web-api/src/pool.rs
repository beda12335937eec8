use async_trait::async_trait;
use rocket::serde::Deserialize;
use rocket::{Build, Config, Rocket};
use sea_orm::ConnectOptions;
use sea_orm_rocket::{rocket::figment::Figment, Database};
use std::time::Duration;

#[derive(Database, Debug)]
#[database("sea_orm")]
pub struct Db(SeaOrmPool);

#[derive(Debug, Clone)]
pub struct SeaOrmPool {
    pub conn: sea_orm::DatabaseConnection,
}

#[async_trait]
impl sea_orm_rocket::Pool for SeaOrmPool {
    type Error = sea_orm::DbErr;

    type Connection = sea_orm::DatabaseConnection;

    async fn init(_figment: &Figment) -> Result<Self, Self::Error> {
        let config = Config::figment()
            .extract::<ReferralConfig>()
            .map_err(|error| sea_orm::DbErr::Custom(format!("Bad configuration: {}", error)))?;
        let mut options: ConnectOptions = config.database_url.into();
        options
            .max_connections(config.sqlx_max_connections)
            .min_connections(config.sqlx_min_connections.unwrap_or(2))
            .connect_timeout(Duration::from_secs(config.sqlx_connect_timeout.unwrap_or(8)))
            .idle_timeout(Duration::from_secs(config.sqlx_idle_timeout.unwrap_or(8)))
            .max_lifetime(Duration::from_secs(config.sqlx_max_lifetime.unwrap_or(8)))
            .sqlx_logging(config.sqlx_logging.unwrap_or(false))
            .sqlx_logging_level(
                match config
                    .web_api_sqlx_logging_level
                    .parse::<log::LevelFilter>()
                {
                    Ok(level) => level,
                    Err(_) => log::LevelFilter::Info,
                },
            );

        let conn = sea_orm::Database::connect(options).await?;

        Ok(SeaOrmPool { conn })
    }

    fn borrow(&self) -> &Self::Connection {
        &self.conn
    }
}

#[cfg(test)]
impl Db {
    /// Wraps an already migrated connection so it can be managed without the fairing.
    pub fn from_connection(conn: sea_orm::DatabaseConnection) -> Db {
        Db(SeaOrmPool { conn })
    }
}

/// Connection held by the pool fairing, available once `Db::init()` has ignited.
pub fn connection(rocket: &Rocket<Build>) -> Option<sea_orm::DatabaseConnection> {
    Db::fetch(rocket).map(|db| db.0.conn.clone())
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ReferralConfig {
    database_url: String,
    sqlx_max_connections: u32,
    sqlx_min_connections: Option<u32>,
    sqlx_connect_timeout: Option<u64>,
    sqlx_idle_timeout: Option<u64>,
    sqlx_max_lifetime: Option<u64>,
    sqlx_logging: Option<bool>,
    web_api_sqlx_logging_level: String,
    pub rust_log: String,
    pub web_api_log: String,
    pub cors_allowed_domains: String,
    pub jwt_key: String,
    /// Routes platform fees to this user; looked up by role when unset.
    pub admin_user_id: Option<String>,
    pub enable_datadog: bool,
    pub datadog_host: String,
    pub datadog_port: String,
    pub enable_maintenance: bool,
    pub email_api_url: String,
    pub email_api_key: String,
    pub support_email_to: String,
    pub support_email_from: String,
}
