use env_logger::{Builder, Target};
use log::Level;
use std::env;
use std::io::Write;

/// Logs go to stderr; stdout carries translated SQL and query results.
pub fn setup_logger(verbose: bool, level: &str) {
    let level = if verbose {
        Level::Debug
    } else {
        level.parse().unwrap_or(Level::Info)
    };

    let mut builder = Builder::new();
    builder.filter(None, level.to_level_filter());
    builder.target(Target::Stderr);

    builder.format(|buf, record| {
        let prefix = match record.level() {
            Level::Error => "error: ",
            Level::Warn => "warning: ",
            Level::Info => "",
            Level::Debug => "debug: ",
            Level::Trace => "trace: ",
        };
        writeln!(buf, "{}{}", prefix, record.args())
    });

    if env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    }

    // a logger may already be installed (tests, embedding applications)
    let _ = builder.try_init();
}
