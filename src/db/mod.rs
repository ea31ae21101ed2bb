/// Database module for fastcmd
///
/// The command registry and its vector table, both in one SQLite file via sqlx.

pub mod connection;
pub mod models;
pub mod queries;
pub mod vector;

pub use connection::{Database, DatabaseStats};
pub use models::*;
