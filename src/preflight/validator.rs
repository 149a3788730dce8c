use crate::dialects::upsert::has_upsert;
use crate::dialects::ConflictRegistry;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Why a known upsert statement would not translate cleanly
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertIssue {
    /// No registry entry matches; the duplicate-key clause would reach the engine verbatim
    Unregistered {
        table: Option<String>,
        statement: String,
    },
    /// Several entries match; the rewrite would depend on registry order
    Ambiguous {
        tables: Vec<String>,
        statement: String,
    },
}

impl fmt::Display for UpsertIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertIssue::Unregistered { table: Some(table), statement } => write!(
                f,
                "table '{}' has no registered conflict key: {}",
                table,
                preview(statement)
            ),
            UpsertIssue::Unregistered { table: None, statement } => write!(
                f,
                "upsert does not match any registered table: {}",
                preview(statement)
            ),
            UpsertIssue::Ambiguous { tables, statement } => write!(
                f,
                "upsert matches several registered tables ({}): {}",
                tables.join(", "),
                preview(statement)
            ),
        }
    }
}

fn preview(statement: &str) -> String {
    let flat = statement.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > 80 {
        format!("{}...", flat.chars().take(80).collect::<String>())
    } else {
        flat
    }
}

fn insert_target_re() -> &'static Regex {
    static INSERT_TARGET: OnceLock<Regex> = OnceLock::new();
    INSERT_TARGET.get_or_init(|| {
        Regex::new(r"(?i)INSERT\s+INTO\s+([A-Za-z_][A-Za-z0-9_.]*)")
            .expect("INSERT INTO pattern is valid")
    })
}

/// Table named by the first `INSERT INTO` of a statement, if any
pub fn insert_target(sql: &str) -> Option<String> {
    insert_target_re()
        .captures(sql)
        .map(|caps| caps[1].to_string())
}

/// Check every upsert among `statements` against `registry`.
///
/// Statements without the duplicate-key marker are ignored.
pub fn check_statements<'a, I>(registry: &ConflictRegistry, statements: I) -> Vec<UpsertIssue>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut issues = Vec::new();

    for statement in statements.into_iter().filter(|s| has_upsert(s)) {
        let matches = registry.all_matches(statement);
        match matches.len() {
            1 => {}
            0 => issues.push(UpsertIssue::Unregistered {
                table: insert_target(statement),
                statement: statement.to_string(),
            }),
            _ => issues.push(UpsertIssue::Ambiguous {
                tables: matches.iter().map(|e| e.table.clone()).collect(),
                statement: statement.to_string(),
            }),
        }
    }

    issues
}
