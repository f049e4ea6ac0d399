use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::{
    api::AppState,
    error::{AppError, AppResult},
    models::{RatedMovie, User, UserId},
};

#[derive(Debug, Serialize)]
pub struct UserDetailResponse {
    #[serde(flatten)]
    pub user: User,
    pub ratings: Vec<RatedMovie>,
}

/// Lists all users
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.repo.list_users().await?))
}

/// Shows a user along with the movies they rated
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<UserDetailResponse>> {
    let user = state
        .repo
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    let ratings = state.repo.rated_movies_for_user(user_id).await?;

    Ok(Json(UserDetailResponse { user, ratings }))
}
