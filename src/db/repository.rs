use crate::{
    error::AppResult,
    models::{Movie, MovieId, NewMovie, NewUser, RatedMovie, Rating, Score, User, UserId},
};

/// Returned as a conflict when an email is already registered
pub const DUPLICATE_EMAIL_MESSAGE: &str = "You are already registered! Please log in.";

/// Persistence port for users, movies and ratings
///
/// Handlers and services only ever see this trait. The PostgreSQL adapter is
/// used in production, the in-memory adapter in tests and local runs.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RatingsRepository: Send + Sync {
    /// Fails with `AppError::Conflict` when the email is already registered
    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn get_user(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// All users ordered by id
    async fn list_users(&self) -> AppResult<Vec<User>>;

    async fn create_movie(&self, movie: NewMovie) -> AppResult<Movie>;

    async fn get_movie(&self, movie_id: MovieId) -> AppResult<Option<Movie>>;

    /// All movies ordered by title
    async fn list_movies(&self) -> AppResult<Vec<Movie>>;

    /// Ratings authored by a user, in creation order
    async fn ratings_for_user(&self, user_id: UserId) -> AppResult<Vec<Rating>>;

    /// A user's ratings joined with the movie titles, in creation order
    async fn rated_movies_for_user(&self, user_id: UserId) -> AppResult<Vec<RatedMovie>>;

    /// Ratings on a movie, in creation order
    async fn ratings_for_movie(&self, movie_id: MovieId) -> AppResult<Vec<Rating>>;

    /// Creates the user's rating for a movie, or replaces the score of the existing one
    async fn upsert_rating(
        &self,
        user_id: UserId,
        movie_id: MovieId,
        score: Score,
    ) -> AppResult<Rating>;
}
