//! Session storage in Redis
//!
//! A session is an opaque token mapped to a JSON `SessionUser` under
//! `session:{token}` with a fixed expiry.

use async_trait::async_trait;
use shared::SessionUser;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Open a session and return its token
    async fn create(&self, user: &SessionUser) -> AppResult<String>;

    /// Identity behind a token; `None` when unknown or expired
    async fn resolve(&self, token: &str) -> AppResult<Option<SessionUser>>;

    async fn revoke(&self, token: &str) -> AppResult<()>;
}

pub fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

#[derive(Clone)]
pub struct RedisSessionStore {
    client: redis::Client,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            ttl_seconds,
        })
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, user: &SessionUser) -> AppResult<String> {
        let token = Uuid::new_v4().simple().to_string();
        let payload = serde_json::to_string(user)
            .map_err(|e| AppError::Internal(format!("Failed to encode session: {}", e)))?;

        let mut conn = self.connection().await?;
        redis::cmd("SET")
            .arg(session_key(&token))
            .arg(payload)
            .arg("EX")
            .arg(self.ttl_seconds)
            .query_async::<_, ()>(&mut conn)
            .await?;

        tracing::debug!("Opened session for user {}", user.id);
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> AppResult<Option<SessionUser>> {
        let mut conn = self.connection().await?;
        let payload: Option<String> = redis::cmd("GET")
            .arg(session_key(token))
            .query_async(&mut conn)
            .await?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        match serde_json::from_str(&payload) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!("Discarding unreadable session payload: {}", e);
                Ok(None)
            }
        }
    }

    async fn revoke(&self, token: &str) -> AppResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("DEL")
            .arg(session_key(token))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}
