use anyhow::Context;
use async_trait::async_trait;
use sqlx::{pool::PoolConnection, PgConnection, PgPool, Postgres};
use tracing::debug;

use crate::auth::repo::UserRepo;
use crate::documents::repo::DocumentRepo;

#[cfg(test)]
pub mod memory;

/// Everything a single request may read or write, over one connection.
pub trait StoreSession: UserRepo + DocumentRepo {}

impl<T: UserRepo + DocumentRepo> StoreSession for T {}

/// Hands out a fresh session per request. Dropping the session releases
/// whatever it holds, on success and error paths alike.
#[async_trait]
pub trait Store: Send + Sync {
    async fn session(&self) -> anyhow::Result<Box<dyn StoreSession>>;
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn session(&self) -> anyhow::Result<Box<dyn StoreSession>> {
        let conn = self
            .pool
            .acquire()
            .await
            .context("acquire database connection")?;
        debug!("store session opened");
        Ok(Box::new(PgSession { conn }))
    }
}

/// One pooled Postgres connection, returned to the pool on drop.
pub struct PgSession {
    conn: PoolConnection<Postgres>,
}

impl PgSession {
    pub(crate) fn conn(&mut self) -> &mut PgConnection {
        &mut self.conn
    }
}
