//! Process-wide logging for the stock transfer runners.

pub mod logging;

pub use logging::{init, init_with, LogFormat, DEFAULT_FILTER};
