//! Rewrites MySQL `ON DUPLICATE KEY UPDATE` upserts into `ON CONFLICT ... DO UPDATE SET`.
//!
//! Supported shape (one registered table per statement):
//!
//! ```text
//! INSERT INTO <table> (<cols>) VALUES (<vals>)
//! ON DUPLICATE KEY UPDATE col = VALUES(col), ...
//! ```

use crate::dialects::registry::ConflictRegistry;
use log::{trace, warn};
use regex::Regex;
use std::sync::OnceLock;

/// Literal marker that triggers the upsert rewrite
pub const DUPLICATE_KEY_MARKER: &str = "DUPLICATE KEY";

fn values_ref_re() -> &'static Regex {
    static VALUES_REF: OnceLock<Regex> = OnceLock::new();
    VALUES_REF.get_or_init(|| Regex::new(r"VALUES\(([^)]+)\)").expect("VALUES() pattern is valid"))
}

pub fn has_upsert(sql: &str) -> bool {
    sql.contains(DUPLICATE_KEY_MARKER)
}

/// Rewrite the duplicate-key clause using `registry`, then turn every
/// `VALUES(col)` into `EXCLUDED.col`.
///
/// The second step runs even when no table matched; in that case the marker
/// stays in place and the target engine will reject the statement.
pub fn rewrite_upsert(sql: &str, registry: &ConflictRegistry) -> String {
    let sql = match registry.rewrite_conflict(sql) {
        Some(rewritten) => rewritten,
        None => {
            warn!("No conflict key registered for upsert statement: {}", sql);
            sql.to_string()
        }
    };

    let rewritten = values_ref_re().replace_all(&sql, "EXCLUDED.$1").into_owned();
    trace!("Upsert rewritten: {}", rewritten);
    rewritten
}
