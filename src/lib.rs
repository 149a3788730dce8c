//! Preflight SQL translation.
//!
//! Application code writes MySQL-flavoured SQL once; [`preflight::Translator`]
//! rewrites each statement for SQLite or PostgreSQL immediately before it is
//! executed, and [`preflight::Preflight`] wraps a [`executor::Database`] so this
//! happens on every execute, prepare, query and single-row query.

pub mod dialects;
pub mod executor;
pub mod logger;
pub mod model;
pub mod preflight;

pub use dialects::{ConflictEntry, ConflictRegistry, Dialect};
pub use executor::Database;
pub use model::{Config, Value};
pub use preflight::{Preflight, PreflightError, Translator};
