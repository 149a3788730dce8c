use clap::{Parser, Subcommand};

/// CLI entry point for sqlshim
#[derive(Parser, Debug)]
#[command(
    name = "sqlshim",
    version,
    about = "Translate MySQL-flavoured SQL for SQLite and PostgreSQL"
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Environment (loads config/{env}.toml)
    #[arg(long, global = true)]
    pub env: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a statement as it would be sent to the target engine
    Translate {
        /// SQL statement (read from stdin when neither this nor --file is given)
        sql: Option<String>,

        /// Translate every statement in a .sql file
        #[arg(long, conflicts_with = "sql")]
        file: Option<String>,

        /// Target dialect, overriding database.driver
        #[arg(long)]
        dialect: Option<String>,
    },

    /// Check known upsert statements against the conflict registry
    Check {
        /// .sql file or directory; repeatable. Defaults to preflight.statements
        #[arg(long)]
        path: Vec<String>,
    },

    /// Show the rewrite rules and conflict registry
    Rules {
        /// Only show rules for this dialect
        #[arg(long)]
        dialect: Option<String>,
    },

    /// Run a statement through the preflight layer over ODBC
    Exec {
        /// SQL statement in the canonical dialect
        sql: String,

        /// ODBC connection string
        #[arg(long)]
        conn: Option<String>,

        /// Positional argument bound to the next '?'; repeatable
        #[arg(long = "arg")]
        args: Vec<String>,
    },

    /// Generate configuration file
    Config {
        /// Output path for config file
        #[arg(long, default_value = "config.toml")]
        output: String,
    },
}
