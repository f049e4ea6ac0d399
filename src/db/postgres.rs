use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{repository::DUPLICATE_EMAIL_MESSAGE, RatingsRepository},
    error::{AppError, AppResult},
    models::{Movie, MovieId, NewMovie, NewUser, RatedMovie, Rating, Score, User, UserId},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the bundled schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Turns a violation of `users.email UNIQUE` into a conflict; other errors pass through
fn duplicate_email_as_conflict(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(DUPLICATE_EMAIL_MESSAGE.to_string())
        }
        other => AppError::from(other),
    }
}

/// [`RatingsRepository`] backed by PostgreSQL
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RatingsRepository for PgRepository {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password, age, zipcode)
            VALUES ($1, $2, $3, $4)
            RETURNING user_id, email, password, age, zipcode
            "#,
        )
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.age)
        .bind(&user.zipcode)
        .fetch_one(&self.pool)
        .await
        .map_err(duplicate_email_as_conflict)?;

        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, email, password, age, zipcode FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, email, password, age, zipcode FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT user_id, email, password, age, zipcode FROM users ORDER BY user_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn create_movie(&self, movie: NewMovie) -> AppResult<Movie> {
        let created = sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (title, released_at, imdb_url)
            VALUES ($1, $2, $3)
            RETURNING movie_id, title, released_at, imdb_url
            "#,
        )
        .bind(&movie.title)
        .bind(movie.released_at)
        .bind(&movie.imdb_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_movie(&self, movie_id: MovieId) -> AppResult<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>(
            "SELECT movie_id, title, released_at, imdb_url FROM movies WHERE movie_id = $1",
        )
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(movie)
    }

    async fn list_movies(&self) -> AppResult<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>(
            "SELECT movie_id, title, released_at, imdb_url FROM movies ORDER BY title, movie_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(movies)
    }

    async fn ratings_for_user(&self, user_id: UserId) -> AppResult<Vec<Rating>> {
        let ratings = sqlx::query_as::<_, Rating>(
            r#"
            SELECT rating_id, movie_id, user_id, score
            FROM ratings
            WHERE user_id = $1
            ORDER BY rating_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ratings)
    }

    async fn rated_movies_for_user(&self, user_id: UserId) -> AppResult<Vec<RatedMovie>> {
        let rated = sqlx::query_as::<_, RatedMovie>(
            r#"
            SELECT r.movie_id, m.title, r.score
            FROM ratings r
            JOIN movies m ON m.movie_id = r.movie_id
            WHERE r.user_id = $1
            ORDER BY r.rating_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rated)
    }

    async fn ratings_for_movie(&self, movie_id: MovieId) -> AppResult<Vec<Rating>> {
        let ratings = sqlx::query_as::<_, Rating>(
            r#"
            SELECT rating_id, movie_id, user_id, score
            FROM ratings
            WHERE movie_id = $1
            ORDER BY rating_id
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ratings)
    }

    async fn upsert_rating(
        &self,
        user_id: UserId,
        movie_id: MovieId,
        score: Score,
    ) -> AppResult<Rating> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (user_id, movie_id, score)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, movie_id) DO UPDATE SET score = EXCLUDED.score
            RETURNING rating_id, movie_id, user_id, score
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .bind(score)
        .fetch_one(&self.pool)
        .await?;

        Ok(rating)
    }
}
