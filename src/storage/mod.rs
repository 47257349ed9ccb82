pub mod backend;
pub mod insight_cache;
pub mod models;
pub mod url_store;

pub use backend::{KeySpace, KvStore, MemoryStore, RedisStore, StoreFactory};
pub use insight_cache::InsightCache;
pub use models::{Insight, UrlRecord, VisitStats};
pub use url_store::UrlStore;
