use std::fmt::Display;
use std::str::FromStr;

use uuid::Uuid;

use crate::{error::AppResult, models::UserId};

/// Opaque login session identifier handed to the client in a cookie
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(Uuid);

impl SessionToken {
    /// Creates a new random session token
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Session storage port
///
/// Maps session tokens to the user they were issued for.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Issues a new session for the user
    async fn create(&self, user_id: UserId) -> AppResult<SessionToken>;

    /// Returns the user a live session belongs to
    async fn resolve(&self, token: &SessionToken) -> AppResult<Option<UserId>>;

    /// Ends a session. Unknown tokens are ignored.
    async fn revoke(&self, token: &SessionToken) -> AppResult<()>;

    /// How long a session stays valid, in seconds
    fn ttl_secs(&self) -> u64;
}
