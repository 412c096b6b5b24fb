pub mod cache;

pub use cache::{normalize_cache_key, ResultCache, CACHE_TTL_SECS};
