use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info, warn};

use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::store::{PgStore, Store};

/// What a configured server needs to answer requests.
#[derive(Clone)]
pub struct Services {
    pub keys: JwtKeys,
    pub store: Arc<dyn Store>,
}

#[derive(Clone)]
pub struct AppState {
    services: Option<Services>,
}

impl AppState {
    /// Loads configuration and connects the pool. Missing configuration is
    /// not fatal: the server starts and answers every request with a 500.
    pub async fn init() -> anyhow::Result<Self> {
        let config = match AppConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "server configuration incomplete; requests will be rejected");
                return Ok(Self::unconfigured());
            }
        };

        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        // Run migrations if present
        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            warn!(error = %e, "migration failed; continuing");
        }

        info!(ttl_days = config.jwt.ttl_days, "auth configured");
        Ok(Self::from_parts(
            JwtKeys::new(&config.jwt),
            Arc::new(PgStore::new(db)) as Arc<dyn Store>,
        ))
    }

    pub fn from_parts(keys: JwtKeys, store: Arc<dyn Store>) -> Self {
        Self {
            services: Some(Services { keys, store }),
        }
    }

    pub fn unconfigured() -> Self {
        Self { services: None }
    }

    pub fn services(&self) -> Result<&Services, ApiError> {
        self.services.as_ref().ok_or(ApiError::Configuration)
    }
}
