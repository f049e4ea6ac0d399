use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers::{self, auth, movies, users};
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Accounts
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        // Users
        .route("/users", get(users::list_users))
        .route("/users/:user_id", get(users::get_user))
        // Movies
        .route("/movies", get(movies::list_movies))
        .route("/movies/:movie_id", get(movies::get_movie))
        .route("/movies/:movie_id/rating", post(movies::rate_movie))
        .route("/movies/:movie_id/prediction", get(movies::get_prediction))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}
