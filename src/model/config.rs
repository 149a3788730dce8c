use crate::dialects::{ConflictEntry, Dialect, DialectError};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub preflight: PreflightConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Conflict keys added to (or overriding) the built-in registry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<ConflictEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Target engine: "sqlite", "postgres", or unset for no translation
    pub driver: Option<String>,

    /// ODBC connection string
    pub connection_string: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PreflightConfig {
    /// `.sql` files or directories holding every statement the application issues
    #[serde(default)]
    pub statements: Vec<String>,

    /// Refuse to start when a known upsert has no usable conflict key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

const DEFAULT_STRICT: bool = true;
const DEFAULT_LOG_LEVEL: &str = "info";

// Sections read from a file leave unset fields `None`; only the base default fills them
impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            preflight: PreflightConfig {
                statements: Vec::new(),
                strict: Some(DEFAULT_STRICT),
            },
            logging: LoggingConfig {
                level: Some(DEFAULT_LOG_LEVEL.to_string()),
            },
            conflicts: Vec::new(),
        }
    }
}

impl PreflightConfig {
    pub fn is_strict(&self) -> bool {
        self.strict.unwrap_or(DEFAULT_STRICT)
    }
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

impl Config {
    /// Load configuration from file with environment override support
    pub fn load(config_path: Option<&str>, environment: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Load base configuration file
        if let Some(path) = config_path {
            config = Self::load_from_file(path)?;
        } else {
            // Try loading from standard locations
            for standard_path in Self::standard_config_paths() {
                if standard_path.exists() {
                    debug!("Loading config from: {}", standard_path.display());
                    config = Self::load_from_file(&standard_path.to_string_lossy())?;
                    break;
                }
            }
        }

        // Load environment-specific overrides
        if let Some(env) = environment {
            if let Ok(env_config) = Self::load_environment_config(env) {
                debug!("Applying environment config for: {}", env);
                config = config.merge(env_config);
            }
        }

        // Load local overrides (always last)
        if let Ok(local_config) = Self::load_from_file("config/local.toml") {
            debug!("Applying local config overrides");
            config = config.merge(local_config);
        }

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_string(), e.to_string()))
    }

    fn load_environment_config(environment: &str) -> Result<Self, ConfigError> {
        let env_path = format!("config/{}.toml", environment);
        Self::load_from_file(&env_path)
    }

    /// Get standard configuration file paths in order of precedence
    fn standard_config_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from("config.toml"),
            PathBuf::from("config/default.toml"),
        ]
    }

    /// Merge this config with another, with the other taking precedence
    pub fn merge(mut self, other: Self) -> Self {
        if other.database.driver.is_some() {
            self.database.driver = other.database.driver;
        }
        if other.database.connection_string.is_some() {
            self.database.connection_string = other.database.connection_string;
        }

        if !other.preflight.statements.is_empty() {
            self.preflight.statements = other.preflight.statements;
        }
        if other.preflight.strict.is_some() {
            self.preflight.strict = other.preflight.strict;
        }

        if other.logging.level.is_some() {
            self.logging.level = other.logging.level;
        }

        // later files extend the registry; same-table entries replace earlier ones
        for entry in other.conflicts {
            match self.conflicts.iter_mut().find(|e| e.table == entry.table) {
                Some(existing) => existing.columns = entry.columns,
                None => self.conflicts.push(entry),
            }
        }

        self
    }

    /// The dialect selected by `database.driver`
    pub fn dialect(&self) -> Result<Dialect, DialectError> {
        Dialect::from_driver(self.database.driver.as_deref())
    }

    /// Generate a default configuration file
    pub fn generate_default_config(path: &str) -> Result<(), ConfigError> {
        let config = Config::default();
        let toml_content =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, toml_content)
            .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}': {1}")]
    FileRead(String, String),

    #[error("Failed to parse config file '{0}': {1}")]
    Parse(String, String),

    #[error("Failed to write config file '{0}': {1}")]
    FileWrite(String, String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_config_default_values() {
        let config = Config::default();

        assert_eq!(config.database.driver, None);
        assert_eq!(config.database.connection_string, None);
        assert!(config.preflight.statements.is_empty());
        assert!(config.preflight.is_strict());
        assert_eq!(config.logging.level(), "info");
        assert!(config.conflicts.is_empty());
        assert_eq!(config.dialect().unwrap(), Dialect::Canonical);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();

        assert!(toml_str.contains("[preflight]"));
        assert!(toml_str.contains("[logging]"));
        assert!(toml_str.contains("strict = true"));
        assert!(toml_str.contains("level = \"info\""));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
[database]
driver = "postgres"
connection_string = "Driver={PostgreSQL Unicode};Server=localhost;"

[preflight]
statements = ["./sql", "./queries/upserts.sql"]
strict = false

[logging]
level = "debug"

[[conflicts]]
table = "apikey"
columns = "user_id"

[[conflicts]]
table = "invitation"
columns = "code"
        "#;

        let config: Config = toml::from_str(toml_content).unwrap();

        assert_eq!(config.database.driver.as_deref(), Some("postgres"));
        assert_eq!(config.dialect().unwrap(), Dialect::Postgres);
        assert_eq!(
            config.preflight.statements,
            vec!["./sql".to_string(), "./queries/upserts.sql".to_string()]
        );
        assert!(!config.preflight.is_strict());
        assert_eq!(config.logging.level(), "debug");
        assert_eq!(
            config.conflicts,
            vec![
                ConflictEntry::new("apikey", "user_id"),
                ConflictEntry::new("invitation", "code"),
            ]
        );
    }

    #[test]
    fn test_config_partial_deserialization() {
        let toml_content = r#"
[database]
driver = "sqlite"
        "#;

        let config: Config = toml::from_str(toml_content).unwrap();

        assert_eq!(config.dialect().unwrap(), Dialect::Sqlite);
        assert!(config.preflight.is_strict());
        assert_eq!(config.logging.level(), "info");
    }

    #[test]
    fn test_unknown_driver() {
        let config: Config = toml::from_str("[database]\ndriver = \"oracle\"").unwrap();
        assert!(matches!(config.dialect(), Err(DialectError::NotFound(_))));
    }

    #[test]
    fn test_config_load_from_file() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "[database]\ndriver = \"pg\"\n").unwrap();

        let config = Config::load_from_file(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.dialect().unwrap(), Dialect::Postgres);
    }

    #[test]
    fn test_config_load_from_nonexistent_file() {
        let result = Config::load_from_file("/nonexistent/config.toml");
        assert!(matches!(result.unwrap_err(), ConfigError::FileRead(_, _)));
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "invalid toml content [[[").unwrap();

        let result = Config::load_from_file(temp_file.path().to_str().unwrap());
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_, _)));
    }

    #[test]
    fn test_config_merge() {
        let base_config = Config {
            database: DatabaseConfig {
                driver: Some("sqlite".to_string()),
                connection_string: Some("base-connection".to_string()),
            },
            conflicts: vec![
                ConflictEntry::new("apikey", "user_id"),
                ConflictEntry::new("invitation", "code"),
            ],
            ..Config::default()
        };

        let override_config = Config {
            database: DatabaseConfig {
                driver: Some("postgres".to_string()),
                connection_string: None,
            },
            preflight: PreflightConfig {
                statements: vec!["./sql".to_string()],
                strict: Some(false),
            },
            conflicts: vec![
                ConflictEntry::new("invitation", "code, user_id"),
                ConflictEntry::new("usage", "day"),
            ],
            ..Config::default()
        };

        let merged = base_config.merge(override_config);

        assert_eq!(merged.database.driver.as_deref(), Some("postgres"));
        // None connection string should not override existing one
        assert_eq!(
            merged.database.connection_string.as_deref(),
            Some("base-connection")
        );
        assert_eq!(merged.preflight.statements, vec!["./sql".to_string()]);
        assert!(!merged.preflight.is_strict());
        assert_eq!(
            merged.conflicts,
            vec![
                ConflictEntry::new("apikey", "user_id"),
                ConflictEntry::new("invitation", "code, user_id"),
                ConflictEntry::new("usage", "day"),
            ]
        );
    }

    #[test]
    fn test_partial_override_keeps_base_settings() {
        let base_config: Config = toml::from_str(
            "[preflight]\nstrict = false\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();
        let override_config: Config =
            toml::from_str("[database]\ndriver = \"postgres\"\n").unwrap();

        let merged = base_config.merge(override_config);

        assert_eq!(merged.dialect().unwrap(), Dialect::Postgres);
        assert!(!merged.preflight.is_strict());
        assert_eq!(merged.logging.level(), "debug");
    }

    #[test]
    fn test_override_can_restore_strict() {
        let base_config: Config = toml::from_str("[preflight]\nstrict = false\n").unwrap();
        let override_config: Config = toml::from_str("[preflight]\nstrict = true\n").unwrap();

        assert!(base_config.merge(override_config).preflight.is_strict());
    }

    #[test]
    fn test_generate_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("generated-config.toml");

        Config::generate_default_config(config_path.to_str().unwrap()).unwrap();
        assert!(config_path.exists());

        let loaded_config = Config::load_from_file(config_path.to_str().unwrap()).unwrap();
        assert_eq!(loaded_config.database.driver, None);
        assert!(loaded_config.preflight.is_strict());
        assert_eq!(loaded_config.logging.level(), "info");
    }

    #[test]
    fn test_config_error_display() {
        let errors = vec![
            ConfigError::FileRead("test.toml".to_string(), "Not found".to_string()),
            ConfigError::Parse("test.toml".to_string(), "Invalid syntax".to_string()),
            ConfigError::FileWrite("test.toml".to_string(), "Permission denied".to_string()),
            ConfigError::Serialize("Invalid value".to_string()),
        ];

        for error in errors {
            let error_string = format!("{}", error);
            match error {
                ConfigError::FileRead(path, _) => assert!(error_string.contains(&path)),
                ConfigError::Parse(path, _) => assert!(error_string.contains(&path)),
                ConfigError::FileWrite(path, _) => assert!(error_string.contains(&path)),
                ConfigError::Serialize(_) => assert!(error_string.contains("serialize")),
            }
        }
    }
}
