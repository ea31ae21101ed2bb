/// fastcmd library
///
/// Store shell commands under plain-language descriptions and find them
/// again by describing what you want to do.

pub mod config;
pub mod core;
pub mod db;
pub mod embeddings;
pub mod error;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use config::{SearchMode, Settings};
pub use crate::core::{FastCmd, Report};
pub use db::Database;
pub use error::{FastCmdError, Result};
