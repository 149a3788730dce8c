#![allow(dead_code)]

use assert_cmd::Command;
use sqlshim::executor::Database;
use sqlshim::model::Value;
use std::cell::RefCell;
use std::fs;
use tempfile::{tempdir, TempDir};

/// Returns a configured Command for `sqlshim`
pub fn sqlshim_cmd() -> Command {
    Command::cargo_bin("sqlshim").expect("Binary not found")
}

/// Prepares a temp dir with a `sql/` directory of application statements
pub fn setup_statements(upserts: &[&str]) -> TempDir {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let sql_dir = temp_dir.path().join("sql");
    fs::create_dir(&sql_dir).expect("Failed to create sql directory");

    fs::write(
        sql_dir.join("0001_schema.sql"),
        "CREATE TABLE quota (id INT PRIMARY KEY AUTO_INCREMENT, user_id INT UNIQUE, quota DECIMAL(16,4));\n\
         CREATE TABLE broadcast (id INT PRIMARY KEY AUTO_INCREMENT, content TEXT, created_at DATETIME);",
    )
    .unwrap();

    fs::write(sql_dir.join("0002_upserts.sql"), upserts.join(";\n")).unwrap();

    temp_dir
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("mock database rejected: {0}")]
pub struct MockError(pub String);

/// Records every call; statements containing `fail_on` are rejected
#[derive(Debug, Default)]
pub struct RecordingDatabase {
    pub calls: RefCell<Vec<(&'static str, String, Vec<Value>)>>,
    pub fail_on: Option<String>,
}

impl RecordingDatabase {
    pub fn failing_on(marker: &str) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_on: Some(marker.to_string()),
        }
    }

    fn record(&self, kind: &'static str, sql: &str, args: &[Value]) -> Result<(), MockError> {
        self.calls
            .borrow_mut()
            .push((kind, sql.to_string(), args.to_vec()));
        match &self.fail_on {
            Some(marker) if sql.contains(marker.as_str()) => Err(MockError(sql.to_string())),
            _ => Ok(()),
        }
    }

    pub fn last_sql(&self) -> String {
        self.calls.borrow().last().map(|c| c.1.clone()).unwrap_or_default()
    }
}

/// Prepared statement handle that remembers its text
#[derive(Debug)]
pub struct MockStatement<'s> {
    pub sql: String,
    pub owner: &'s RecordingDatabase,
}

impl Database for RecordingDatabase {
    type Error = MockError;
    type ExecResult = u64;
    type Rows = Vec<Vec<Value>>;
    type Row = Vec<Value>;
    type Statement<'s>
        = MockStatement<'s>
    where
        Self: 's;

    fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, MockError> {
        self.record("execute", sql, args)?;
        Ok(1)
    }

    fn prepare(&self, sql: &str) -> Result<MockStatement<'_>, MockError> {
        self.record("prepare", sql, &[])?;
        Ok(MockStatement {
            sql: sql.to_string(),
            owner: self,
        })
    }

    fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Vec<Value>>, MockError> {
        self.record("query", sql, args)?;
        Ok(vec![args.to_vec(), args.to_vec()])
    }

    fn query_row(&self, sql: &str, args: &[Value]) -> Result<Option<Vec<Value>>, MockError> {
        self.record("query_row", sql, args)?;
        Ok(Some(args.to_vec()))
    }
}
