use crate::dialects::base::DialectError;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Columns that identify a row of `table` for upsert conflict detection
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConflictEntry {
    pub table: String,
    /// Comma separated column list, e.g. `"user_id, type"`
    pub columns: String,
}

impl ConflictEntry {
    pub fn new(table: &str, columns: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: columns.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConflictFile {
    #[serde(rename = "conflict", default)]
    conflicts: Vec<ConflictEntry>,
}

#[derive(Debug, Clone)]
struct CompiledEntry {
    entry: ConflictEntry,
    upsert: Regex,
}

/// Ordered table -> conflict columns mapping used by the upsert rewriter.
///
/// Entries are scanned in declaration order. A statement is expected to match
/// exactly one entry; `preflight::validator` reports statements that don't.
#[derive(Debug, Clone)]
pub struct ConflictRegistry {
    entries: Vec<CompiledEntry>,
}

static BUILTIN: OnceLock<Vec<ConflictEntry>> = OnceLock::new();

fn builtin_entries() -> &'static [ConflictEntry] {
    BUILTIN.get_or_init(|| {
        let conflicts_str = include_str!("conflicts.toml");
        let file: ConflictFile =
            toml::from_str(conflicts_str).expect("Failed to parse built-in conflict registry");
        file.conflicts
    })
}

fn identifier_re() -> &'static Regex {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
            .expect("identifier pattern is valid")
    })
}

fn validate(entry: &ConflictEntry) -> Result<(), DialectError> {
    let ident = identifier_re();
    if !ident.is_match(&entry.table) {
        return Err(DialectError::InvalidConflictEntry {
            table: entry.table.clone(),
            reason: "table must be a plain identifier".to_string(),
        });
    }

    let columns: Vec<&str> = entry.columns.split(',').map(str::trim).collect();
    if columns.iter().any(|c| !ident.is_match(c)) {
        return Err(DialectError::InvalidConflictEntry {
            table: entry.table.clone(),
            reason: format!("invalid conflict column list '{}'", entry.columns),
        });
    }

    Ok(())
}

impl ConflictRegistry {
    /// Build a registry, rejecting malformed entries and duplicate tables
    pub fn new(entries: Vec<ConflictEntry>) -> Result<Self, DialectError> {
        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(entries.len());

        for entry in entries {
            validate(&entry)?;
            if !seen.insert(entry.table.clone()) {
                return Err(DialectError::DuplicateTable(entry.table));
            }

            // (?s): the column and value lists may span several lines
            let pattern = format!(
                r"(?s)(INSERT INTO {}\b.*?)ON DUPLICATE KEY UPDATE",
                regex::escape(&entry.table)
            );
            let upsert = Regex::new(&pattern).map_err(|e| DialectError::InvalidConflictEntry {
                table: entry.table.clone(),
                reason: e.to_string(),
            })?;

            debug!("Registering conflict key for {}: ({})", entry.table, entry.columns);
            compiled.push(CompiledEntry { entry, upsert });
        }

        Ok(Self { entries: compiled })
    }

    /// An empty registry; every upsert is left untouched
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The registry shipped with the crate
    pub fn builtin() -> Self {
        Self::new(builtin_entries().to_vec()).expect("Built-in conflict registry is valid")
    }

    /// Built-in entries overlaid with `extra`.
    ///
    /// An extra entry for an already known table replaces its columns in place;
    /// new tables are appended in the order given.
    pub fn with_builtin(extra: Vec<ConflictEntry>) -> Result<Self, DialectError> {
        let mut entries = builtin_entries().to_vec();
        for entry in extra {
            match entries.iter_mut().find(|e| e.table == entry.table) {
                Some(existing) => existing.columns = entry.columns,
                None => entries.push(entry),
            }
        }
        Self::new(entries)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ConflictEntry> {
        self.entries.iter().map(|c| &c.entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, table: &str) -> Option<&ConflictEntry> {
        self.entries().find(|e| e.table == table)
    }

    /// First entry, in registry order, whose upsert shape matches `sql`
    pub fn find_match(&self, sql: &str) -> Option<&ConflictEntry> {
        self.entries
            .iter()
            .find(|c| c.upsert.is_match(sql))
            .map(|c| &c.entry)
    }

    /// Every entry whose upsert shape matches `sql`
    pub fn all_matches(&self, sql: &str) -> Vec<&ConflictEntry> {
        self.entries
            .iter()
            .filter(|c| c.upsert.is_match(sql))
            .map(|c| &c.entry)
            .collect()
    }

    /// Rewrite the duplicate-key marker of the first matching entry.
    /// Returns `None` when no entry matches.
    pub(crate) fn rewrite_conflict(&self, sql: &str) -> Option<String> {
        let compiled = self.entries.iter().find(|c| c.upsert.is_match(sql))?;
        let columns = &compiled.entry.columns;
        let rewritten = compiled
            .upsert
            .replace_all(sql, |caps: &regex::Captures<'_>| {
                format!("{}ON CONFLICT({}) DO UPDATE SET", &caps[1], columns)
            })
            .into_owned();
        Some(rewritten)
    }
}

impl Default for ConflictRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
