use std::collections::{BTreeMap, HashMap};

use tokio::sync::RwLock;

use crate::{
    db::{repository::DUPLICATE_EMAIL_MESSAGE, RatingsRepository, SessionStore, SessionToken},
    error::{AppError, AppResult},
    models::{
        Movie, MovieId, NewMovie, NewUser, RatedMovie, Rating, RatingId, Score, User, UserId,
    },
};

/// In-process [`RatingsRepository`] for tests and local runs
#[derive(Default)]
pub struct MemoryRepository {
    inner: RwLock<MemoryRepositoryInner>,
}

#[derive(Default)]
struct MemoryRepositoryInner {
    users: BTreeMap<UserId, User>,
    movies: BTreeMap<MovieId, Movie>,
    ratings: BTreeMap<RatingId, Rating>,
    next_user_id: UserId,
    next_movie_id: MovieId,
    next_rating_id: RatingId,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

#[async_trait::async_trait]
impl RatingsRepository for MemoryRepository {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(DUPLICATE_EMAIL_MESSAGE.to_string()));
        }

        let user = User {
            user_id: next_id(&mut inner.next_user_id),
            email: user.email,
            password: user.password,
            age: user.age,
            zipcode: user.zipcode,
        };
        inner.users.insert(user.user_id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&user_id).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn create_movie(&self, movie: NewMovie) -> AppResult<Movie> {
        let mut inner = self.inner.write().await;
        let movie = Movie {
            movie_id: next_id(&mut inner.next_movie_id),
            title: movie.title,
            released_at: movie.released_at,
            imdb_url: movie.imdb_url,
        };
        inner.movies.insert(movie.movie_id, movie.clone());
        Ok(movie)
    }

    async fn get_movie(&self, movie_id: MovieId) -> AppResult<Option<Movie>> {
        Ok(self.inner.read().await.movies.get(&movie_id).cloned())
    }

    async fn list_movies(&self) -> AppResult<Vec<Movie>> {
        let mut movies: Vec<Movie> = self.inner.read().await.movies.values().cloned().collect();
        movies.sort_by(|a, b| a.title.cmp(&b.title).then(a.movie_id.cmp(&b.movie_id)));
        Ok(movies)
    }

    async fn ratings_for_user(&self, user_id: UserId) -> AppResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ratings
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn rated_movies_for_user(&self, user_id: UserId) -> AppResult<Vec<RatedMovie>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ratings
            .values()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| {
                inner.movies.get(&r.movie_id).map(|movie| RatedMovie {
                    movie_id: r.movie_id,
                    title: movie.title.clone(),
                    score: r.score,
                })
            })
            .collect())
    }

    async fn ratings_for_movie(&self, movie_id: MovieId) -> AppResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ratings
            .values()
            .filter(|r| r.movie_id == movie_id)
            .cloned()
            .collect())
    }

    async fn upsert_rating(
        &self,
        user_id: UserId,
        movie_id: MovieId,
        score: Score,
    ) -> AppResult<Rating> {
        let mut inner = self.inner.write().await;

        if let Some(existing) = inner
            .ratings
            .values_mut()
            .find(|r| r.user_id == user_id && r.movie_id == movie_id)
        {
            existing.score = score;
            return Ok(existing.clone());
        }

        let rating = Rating {
            rating_id: next_id(&mut inner.next_rating_id),
            movie_id,
            user_id,
            score,
        };
        inner.ratings.insert(rating.rating_id, rating.clone());
        Ok(rating)
    }
}

/// In-process [`SessionStore`]; sessions never expire
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionToken, UserId>>,
    ttl_secs: u64,
}

impl MemorySessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl_secs,
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(86400)
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: UserId) -> AppResult<SessionToken> {
        let token = SessionToken::new();
        self.sessions.write().await.insert(token.clone(), user_id);
        Ok(token)
    }

    async fn resolve(&self, token: &SessionToken) -> AppResult<Option<UserId>> {
        Ok(self.sessions.read().await.get(token).copied())
    }

    async fn revoke(&self, token: &SessionToken) -> AppResult<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }
}
