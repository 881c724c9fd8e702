//! Background processing of queued analysis requests.

mod consumer;

pub use consumer::{AnalysisConsumer, MessageOutcome};
