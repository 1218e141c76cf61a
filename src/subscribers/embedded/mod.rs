//! # Built-in subscribers
//!
//! - [`LogWriter`]: renders engine events through `tracing`.

mod log;

pub use log::LogWriter;
