use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{AppJson, AppState, CurrentUser},
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{is_valid_score, Movie, MovieId, Rating, Score, MAX_SCORE, MIN_SCORE},
    services::predictions::{self, Prediction},
};

#[derive(Debug, Serialize)]
pub struct MovieDetailResponse {
    #[serde(flatten)]
    pub movie: Movie,
    pub ratings: Vec<Rating>,
    /// The caller's own score, when logged in and already rated
    pub user_score: Option<Score>,
    /// Predicted score for a logged-in caller who has not rated the movie yet
    pub prediction: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RateMovieRequest {
    pub score: Score,
}

async fn find_movie(state: &AppState, movie_id: MovieId) -> AppResult<Movie> {
    state
        .repo
        .get_movie(movie_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", movie_id)))
}

/// Lists all movies by title
pub async fn list_movies(State(state): State<AppState>) -> AppResult<Json<Vec<Movie>>> {
    Ok(Json(state.repo.list_movies().await?))
}

/// Shows a movie with its ratings, personalised when the caller is logged in
pub async fn get_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<MovieId>,
    current: Result<CurrentUser, AppError>,
) -> AppResult<Json<MovieDetailResponse>> {
    // Anonymous callers still see the page; a failing session store does not pass for one
    let current = match current {
        Ok(current) => Some(current),
        Err(AppError::Unauthorized(_)) => None,
        Err(e) => return Err(e),
    };

    let movie = find_movie(&state, movie_id).await?;
    let ratings = state.repo.ratings_for_movie(movie_id).await?;

    let mut user_score = None;
    let mut prediction = None;

    if let Some(current) = current {
        user_score = ratings
            .iter()
            .find(|r| r.user_id == current.user_id)
            .map(|r| r.score);

        if user_score.is_none() {
            prediction = match predictions::predict_for_user(
                state.repo.as_ref(),
                current.user_id,
                movie_id,
            )
            .await
            {
                Ok(p) => Some(p.predicted_score),
                Err(AppError::NoComparableRaters) => None,
                Err(e) => return Err(e),
            };
        }
    }

    Ok(Json(MovieDetailResponse {
        movie,
        ratings,
        user_score,
        prediction,
    }))
}

/// Records the caller's score for a movie, replacing any earlier one
pub async fn rate_movie(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    current: CurrentUser,
    Path(movie_id): Path<MovieId>,
    AppJson(request): AppJson<RateMovieRequest>,
) -> AppResult<Json<Rating>> {
    if !is_valid_score(request.score) {
        return Err(AppError::InvalidInput(format!(
            "Score must be between {} and {}",
            MIN_SCORE, MAX_SCORE
        )));
    }

    find_movie(&state, movie_id).await?;

    let rating = state
        .repo
        .upsert_rating(current.user_id, movie_id, request.score)
        .await?;

    tracing::info!(
        request_id = %request_id,
        user_id = current.user_id,
        movie_id,
        score = rating.score,
        "Rating saved"
    );

    Ok(Json(rating))
}

/// Predicts the caller's score for a movie
pub async fn get_prediction(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    current: CurrentUser,
    Path(movie_id): Path<MovieId>,
) -> AppResult<Json<Prediction>> {
    let prediction =
        predictions::predict_for_user(state.repo.as_ref(), current.user_id, movie_id).await?;

    tracing::info!(
        request_id = %request_id,
        user_id = current.user_id,
        movie_id,
        predicted_score = prediction.predicted_score,
        "Prediction computed"
    );

    Ok(Json(prediction))
}
