use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::Path;

/// Loads the statements an application issues, for the startup upsert check
pub struct StatementLoader;

impl StatementLoader {
    /// Load a single `.sql` file, or every `.sql` file in a directory (sorted by name)
    pub fn load(path: &str) -> io::Result<Vec<String>> {
        let path = Path::new(path);
        if !path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            ));
        }

        if path.is_file() {
            return Self::load_file(path);
        }

        info!("Loading statements from: {}", path.display());
        let mut files = Vec::new();
        for entry in fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.extension().is_some_and(|ext| ext == "sql") {
                files.push(file_path);
            }
        }
        files.sort();

        if files.is_empty() {
            warn!("No .sql files found in {}", path.display());
        }

        let mut statements = Vec::new();
        for file in &files {
            statements.extend(Self::load_file(file)?);
        }

        info!("Loaded {} statements from {} files", statements.len(), files.len());
        Ok(statements)
    }

    fn load_file(path: &Path) -> io::Result<Vec<String>> {
        let content = fs::read_to_string(path)?;
        let statements = Self::split_sql_statements(&content);
        debug!("Loaded {} statements from {}", statements.len(), path.display());
        Ok(statements)
    }

    /// Drop `--` comment lines and split on `;`
    pub fn split_sql_statements(sql: &str) -> Vec<String> {
        sql.lines()
            .filter(|line| !line.trim_start().starts_with("--"))
            .collect::<Vec<&str>>()
            .join("\n")
            .split(';')
            .map(str::trim)
            .filter(|stmt| !stmt.is_empty())
            .map(String::from)
            .collect()
    }
}
