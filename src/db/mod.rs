pub mod memory;
pub mod postgres;
pub mod redis;
pub mod repository;
pub mod session;

pub use memory::{MemoryRepository, MemorySessionStore};
pub use postgres::{create_pool, run_migrations, PgRepository};
pub use self::redis::{create_redis_client, RedisSessionStore};
pub use repository::RatingsRepository;
pub use session::{SessionStore, SessionToken};
