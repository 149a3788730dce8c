mod common;
use common::sqlshim_cmd;
use predicates::prelude::*;

#[test]
fn test_help_command() {
    sqlshim_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Translate MySQL-flavoured SQL for SQLite and PostgreSQL",
        ));
}

#[test]
fn test_version_command() {
    sqlshim_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sqlshim"));
}

#[test]
fn test_invalid_subcommand() {
    sqlshim_cmd()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_missing_subcommand() {
    sqlshim_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: sqlshim"));
}

#[test]
fn test_translate_postgres() {
    let temp_dir = tempfile::tempdir().unwrap();
    sqlshim_cmd()
        .args([
            "translate",
            "--dialect",
            "postgres",
            "INSERT INTO quota (user_id, quota) VALUES (?, ?) ON DUPLICATE KEY UPDATE quota=VALUES(quota)",
        ])
        .current_dir(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "INSERT INTO quota (user_id, quota) VALUES ($1, $2) ON CONFLICT(user_id) DO UPDATE SET quota=EXCLUDED.quota\n",
        ));
}

#[test]
fn test_translate_sqlite_from_stdin() {
    let temp_dir = tempfile::tempdir().unwrap();
    sqlshim_cmd()
        .args(["translate", "--dialect", "sqlite"])
        .write_stdin("CREATE TABLE t (id INT PRIMARY KEY AUTO_INCREMENT, note VARCHAR(255));")
        .current_dir(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "CREATE TABLE t (id INTEGER PRIMARY KEY AUTOINCREMENT, note TEXT)\n",
        ));
}

#[test]
fn test_translate_without_driver_is_identity() {
    let temp_dir = tempfile::tempdir().unwrap();
    sqlshim_cmd()
        .args(["translate", "SELECT * FROM auth WHERE id = ?"])
        .current_dir(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::diff("SELECT * FROM auth WHERE id = ?\n"));
}

#[test]
fn test_translate_file_uses_configured_driver() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        temp_dir.path().join("config.toml"),
        "[database]\ndriver = \"pg\"\n",
    )
    .unwrap();
    std::fs::write(
        temp_dir.path().join("queries.sql"),
        "-- lookups\nSELECT * FROM quota WHERE user_id = ?;\nUPDATE quota SET quota = ? WHERE user_id = ?;\n",
    )
    .unwrap();

    sqlshim_cmd()
        .args(["translate", "--file", "queries.sql"])
        .current_dir(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "SELECT * FROM quota WHERE user_id = $1;\nUPDATE quota SET quota = $1 WHERE user_id = $2;\n",
        ));
}

#[test]
fn test_translate_unknown_dialect() {
    let temp_dir = tempfile::tempdir().unwrap();
    sqlshim_cmd()
        .args(["translate", "--dialect", "oracle", "SELECT 1"])
        .current_dir(&temp_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dialect not found: oracle"));
}

#[test]
fn test_rules_lists_tables_in_order() {
    let temp_dir = tempfile::tempdir().unwrap();
    sqlshim_cmd()
        .args(["rules", "--dialect", "postgres"])
        .current_dir(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("[postgres]"))
        .stdout(predicate::str::contains("8. literal \"INT PRIMARY KEY AUTO_INCREMENT\""))
        .stdout(predicate::str::contains("quota -> (user_id)"))
        .stdout(predicate::str::contains("[sqlite]").not());
}

#[test]
fn test_exec_requires_connection() {
    let temp_dir = tempfile::tempdir().unwrap();
    sqlshim_cmd()
        .args(["exec", "SELECT 1"])
        .current_dir(&temp_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No connection string provided"));
}
