pub mod connection;

pub use connection::{ConnectionError, ConnectionManager, OdbcDatabase};

use crate::model::Value;

/// The database capability statements are finally handed to.
///
/// Return types belong to the implementation; the preflight layer only
/// rewrites the SQL text and forwards arguments and results untouched.
pub trait Database {
    type Error: std::error::Error;
    /// Outcome of a statement that yields no rows
    type ExecResult;
    type Rows;
    type Row;
    /// Reusable prepared statement borrowed from the database handle
    type Statement<'s>
    where
        Self: 's;

    fn execute(&self, sql: &str, args: &[Value]) -> Result<Self::ExecResult, Self::Error>;

    fn prepare(&self, sql: &str) -> Result<Self::Statement<'_>, Self::Error>;

    fn query(&self, sql: &str, args: &[Value]) -> Result<Self::Rows, Self::Error>;

    /// At most one row
    fn query_row(&self, sql: &str, args: &[Value]) -> Result<Option<Self::Row>, Self::Error>;
}
