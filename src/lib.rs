pub mod config;
pub mod error;
pub mod logger;
pub mod problem;
pub mod runner;
pub mod server;

// Re-export commonly used types
pub use error::{CfkitError, Result};
