use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::services::similarity::Score;

pub type UserId = i32;
pub type MovieId = i32;
pub type RatingId = i32;

/// Lowest score a user may give a movie
pub const MIN_SCORE: Score = 1;
/// Highest score a user may give a movie
pub const MAX_SCORE: Score = 5;

/// A registered user
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    pub user_id: UserId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub age: Option<i32>,
    pub zipcode: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub age: Option<i32>,
    pub zipcode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movie {
    pub movie_id: MovieId,
    pub title: String,
    pub released_at: DateTime<Utc>,
    pub imdb_url: String,
}

#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub released_at: DateTime<Utc>,
    pub imdb_url: String,
}

/// One user's score for one movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rating {
    pub rating_id: RatingId,
    pub movie_id: MovieId,
    pub user_id: UserId,
    pub score: Score,
}

/// A user's rating together with the title of the movie it is for
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct RatedMovie {
    pub movie_id: MovieId,
    pub title: String,
    pub score: Score,
}

impl Rating {
    /// `(movie, score)` view used by the similarity engine
    pub fn movie_score(&self) -> (MovieId, Score) {
        (self.movie_id, self.score)
    }
}

/// Checks that a submitted score is within the accepted range
pub fn is_valid_score(score: Score) -> bool {
    (MIN_SCORE..=MAX_SCORE).contains(&score)
}
