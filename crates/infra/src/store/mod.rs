mod in_memory;

#[cfg(feature = "redis")]
mod redis;

pub use in_memory::InMemoryStore;

#[cfg(feature = "redis")]
pub use redis::RedisStore;
