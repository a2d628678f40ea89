//! Shared infrastructure: error types and the event-sink channel.

pub mod error;
pub mod sink;

pub use error::{Error, Result};
pub use sink::{EventSink, MemorySink, NullSink};
