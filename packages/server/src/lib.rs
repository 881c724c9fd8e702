// SEO Audit - API Core
//
// This crate accepts `{url, email}` analysis requests over HTTP, queues them on
// NATS JetStream and runs the analysis pipeline (fetch, score, AI summary,
// store, email) in queue consumers.
//
// Business logic lives in domains/, infrastructure behind Base* traits in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
