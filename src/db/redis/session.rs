use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;

use crate::db::{SessionStore, SessionToken};
use crate::error::AppResult;
use crate::models::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionKey {
    Session(SessionToken),
}

impl Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionKey::Session(token) => write!(f, "session:{}", token),
        }
    }
}

/// Creates a Redis client for session storage
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// [`SessionStore`] backed by Redis keys with an expiry
#[derive(Clone)]
pub struct RedisSessionStore {
    redis_client: Client,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub fn new(redis_client: Client, ttl_secs: u64) -> Self {
        Self {
            redis_client,
            ttl_secs,
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, user_id: UserId) -> AppResult<SessionToken> {
        let token = SessionToken::new();
        let key = SessionKey::Session(token.clone());

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn
            .set_ex(key.to_string(), user_id, self.ttl_secs)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Redis set failed");
                e
            })?;

        tracing::debug!(user_id, ttl = self.ttl_secs, "Session created");

        Ok(token)
    }

    async fn resolve(&self, token: &SessionToken) -> AppResult<Option<UserId>> {
        let key = SessionKey::Session(token.clone());
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        let user_id: Option<UserId> = conn.get(key.to_string()).await.map_err(|e| {
            tracing::warn!(error = %e, "Redis get failed");
            e
        })?;

        Ok(user_id)
    }

    async fn revoke(&self, token: &SessionToken) -> AppResult<()> {
        let key = SessionKey::Session(token.clone());
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(key.to_string()).await?;
        Ok(())
    }

    fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }
}

// TODO : Use a mock Redis server so the round-trip tests below don't need a live instance
