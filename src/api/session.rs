use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::{
    db::SessionToken,
    error::AppError,
    models::UserId,
};

use super::AppState;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "ratings_session";

/// Reads the session token out of the `Cookie` headers, if there is one
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// `Set-Cookie` value that hands a session to the client
pub fn session_cookie(token: &SessionToken, ttl_secs: u64) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, ttl_secs
    )
}

/// `Set-Cookie` value that makes the client drop its session cookie
pub fn expired_session_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Authenticated caller of the current request
///
/// Resolved from the session cookie on every request and passed to handlers
/// explicitly. Rejects with 401 when there is no live session.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub session: SessionToken,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = session_token_from_headers(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Please log in".to_string()))?;

        let user_id = state
            .sessions
            .resolve(&session)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session expired, please log in again".to_string()))?;

        tracing::Span::current().record("user_id", user_id);

        Ok(Self { user_id, session })
    }
}
