/// plocate-runner library
///
/// Builds plocate command lines, runs the system and media database
/// searches side by side, and merges what they print.

pub mod config;
pub mod core;
pub mod error;
pub mod open;
pub mod search;
pub mod update;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use config::Config;
pub use error::{LocateError, Result};
