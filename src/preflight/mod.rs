//! Statement preflight: translate canonical SQL for the active dialect right
//! before it reaches the database.
//!
//! Pipeline per statement:
//! 1. upsert rewrite (only when the duplicate-key marker is present)
//! 2. the dialect's rule table, in order
//! 3. `?` -> `$n` renumbering (PostgreSQL only)
//!
//! The rewrite is lexical, not a parser. Supported shapes are the ones the
//! application emits; `validator` checks known upserts against the registry.

pub mod statement_loader;
pub mod validator;

pub use statement_loader::StatementLoader;
pub use validator::{check_statements, UpsertIssue};

use crate::dialects::{apply_rules, postgres, upsert, ConflictRegistry, Dialect, DialectError};
use crate::executor::Database;
use crate::model::{Config, ConfigError, Value};
use log::{debug, error, info, trace, warn};

#[derive(Debug, thiserror::Error)]
pub enum PreflightError {
    #[error("Dialect error: {0}")]
    Dialect(#[from] DialectError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to load statements from '{0}': {1}")]
    Load(String, String),

    #[error("{} upsert statement(s) cannot be translated: {}", .0.len(), join_issues(.0))]
    UnsafeUpserts(Vec<UpsertIssue>),
}

fn join_issues(issues: &[UpsertIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Immutable translation settings, built once at startup and shared freely
/// between threads.
#[derive(Debug, Clone)]
pub struct Translator {
    dialect: Dialect,
    registry: ConflictRegistry,
}

impl Translator {
    pub fn new(dialect: Dialect, registry: ConflictRegistry) -> Self {
        Self { dialect, registry }
    }

    /// A translator that returns every statement unchanged
    pub fn passthrough() -> Self {
        Self::new(Dialect::Canonical, ConflictRegistry::empty())
    }

    /// Build from configuration and run the upsert check over the configured
    /// statement files.
    ///
    /// With `preflight.strict` any issue aborts startup; otherwise issues are
    /// logged and the translator is returned anyway.
    pub fn from_config(config: &Config) -> Result<Self, PreflightError> {
        let dialect = config.dialect()?;
        let registry = ConflictRegistry::with_builtin(config.conflicts.clone())?;
        let translator = Self::new(dialect, registry);
        info!(
            "Using target dialect: {} ({} conflict keys registered)",
            translator.dialect,
            translator.registry.len()
        );

        let mut statements = Vec::new();
        for path in &config.preflight.statements {
            let loaded = StatementLoader::load(path)
                .map_err(|e| PreflightError::Load(path.clone(), e.to_string()))?;
            statements.extend(loaded);
        }
        if statements.is_empty() {
            return Ok(translator);
        }

        debug!("Checking {} known statements", statements.len());
        match translator.verify(statements.iter().map(String::as_str)) {
            Ok(()) => Ok(translator),
            Err(PreflightError::UnsafeUpserts(issues)) if !config.preflight.is_strict() => {
                for issue in &issues {
                    warn!("{}", issue);
                }
                Ok(translator)
            }
            Err(e) => {
                error!("{}", e);
                Err(e)
            }
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn registry(&self) -> &ConflictRegistry {
        &self.registry
    }

    /// Rewrite `sql` for the active dialect. Never fails; the canonical
    /// dialect returns the input unchanged.
    pub fn translate(&self, sql: &str) -> String {
        if self.dialect.is_canonical() {
            return sql.to_string();
        }

        let mut translated = if upsert::has_upsert(sql) {
            upsert::rewrite_upsert(sql, &self.registry)
        } else {
            sql.to_string()
        };

        translated = apply_rules(&translated, self.dialect.rules());

        if self.dialect.numbers_placeholders() {
            translated = postgres::renumber_placeholders(&translated);
        }

        trace!("Preflight [{}]: {} => {}", self.dialect, sql, translated);
        translated
    }

    /// Check known statements against the conflict registry
    pub fn verify<'a, I>(&self, statements: I) -> Result<(), PreflightError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let issues = check_statements(&self.registry, statements);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(PreflightError::UnsafeUpserts(issues))
        }
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::passthrough()
    }
}

/// A [`Database`] whose statements are translated before they are submitted.
///
/// Arguments and results pass through untouched, and errors come back exactly
/// as the wrapped database produced them.
pub struct Preflight<D> {
    translator: Translator,
    db: D,
}

impl<D: Database> Preflight<D> {
    pub fn new(translator: Translator, db: D) -> Self {
        Self { translator, db }
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn inner(&self) -> &D {
        &self.db
    }

    pub fn into_inner(self) -> D {
        self.db
    }

    pub fn execute(&self, sql: &str, args: &[Value]) -> Result<D::ExecResult, D::Error> {
        let sql = self.translator.translate(sql);
        self.db.execute(&sql, args)
    }

    pub fn prepare(&self, sql: &str) -> Result<D::Statement<'_>, D::Error> {
        let sql = self.translator.translate(sql);
        self.db.prepare(&sql)
    }

    pub fn query(&self, sql: &str, args: &[Value]) -> Result<D::Rows, D::Error> {
        let sql = self.translator.translate(sql);
        self.db.query(&sql, args)
    }

    pub fn query_row(&self, sql: &str, args: &[Value]) -> Result<Option<D::Row>, D::Error> {
        let sql = self.translator.translate(sql);
        self.db.query_row(&sql, args)
    }
}

impl<D: Database> Database for Preflight<D> {
    type Error = D::Error;
    type ExecResult = D::ExecResult;
    type Rows = D::Rows;
    type Row = D::Row;
    type Statement<'s>
        = D::Statement<'s>
    where
        Self: 's;

    fn execute(&self, sql: &str, args: &[Value]) -> Result<Self::ExecResult, Self::Error> {
        Preflight::execute(self, sql, args)
    }

    fn prepare(&self, sql: &str) -> Result<Self::Statement<'_>, Self::Error> {
        Preflight::prepare(self, sql)
    }

    fn query(&self, sql: &str, args: &[Value]) -> Result<Self::Rows, Self::Error> {
        Preflight::query(self, sql, args)
    }

    fn query_row(&self, sql: &str, args: &[Value]) -> Result<Option<Self::Row>, Self::Error> {
        Preflight::query_row(self, sql, args)
    }
}
