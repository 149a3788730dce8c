pub mod config;
pub mod value;

pub use config::{Config, ConfigError, DatabaseConfig, LoggingConfig, PreflightConfig};
pub use value::Value;
