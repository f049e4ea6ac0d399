use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    api::{
        session::{expired_session_cookie, session_cookie, session_token_from_headers},
        AppJson, AppState, CurrentUser,
    },
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{NewUser, User},
    services::accounts,
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub age: Option<i32>,
    pub zipcode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registers a new user
pub async fn register(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AppJson(request): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    tracing::info!(request_id = %request_id, "Processing registration");

    let user = accounts::register(
        state.repo.as_ref(),
        NewUser {
            email: request.email,
            password: request.password,
            age: request.age,
            zipcode: request.zipcode,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Logs a user in and sets the session cookie
pub async fn login(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AppJson(request): AppJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let (user, token) = accounts::log_in(
        state.repo.as_ref(),
        state.sessions.as_ref(),
        &request.email,
        &request.password,
    )
    .await?;

    tracing::info!(request_id = %request_id, user_id = user.user_id, "Login succeeded");

    let cookie = session_cookie(&token, state.sessions.ttl_secs());
    Ok(([(header::SET_COOKIE, cookie)], Json(user)))
}

/// Ends the caller's session, if any, and clears the cookie
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    if let Some(token) = session_token_from_headers(&headers) {
        accounts::log_out(state.sessions.as_ref(), &token).await?;
    }

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, expired_session_cookie())],
    ))
}

/// Returns the logged-in user
pub async fn me(State(state): State<AppState>, current: CurrentUser) -> AppResult<Json<User>> {
    let user = state
        .repo
        .get_user(current.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(user))
}
