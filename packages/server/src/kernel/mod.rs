//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod jobs;
pub mod nats;
pub mod page_fetcher;
pub mod redis_store;
pub mod test_dependencies;
pub mod traits;

pub use deps::{OpenAIAdapter, ResendAdapter, ServerDeps, SystemClock};
pub use nats::{connect_jetstream, ensure_stream, JetStreamQueue};
pub use page_fetcher::HttpPageFetcher;
pub use redis_store::RedisKvStore;
pub use test_dependencies::TestDependencies;
pub use traits::*;
