use crate::cli::args::{Cli, Commands};
use log::{debug, error, info};
use sqlshim::dialects::{list_dialects, ConflictRegistry, Dialect};
use sqlshim::executor::ConnectionManager;
use sqlshim::logger::setup_logger;
use sqlshim::model::{Config, Value};
use sqlshim::preflight::{check_statements, Preflight, StatementLoader, Translator};
use std::io::{self, Read};

pub fn handle(cli: Cli) {
    // Load configuration
    let config = match Config::load(cli.config.as_deref(), cli.env.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            setup_logger(cli.verbose, "info");
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    setup_logger(cli.verbose, config.logging.level());
    debug!("Loaded configuration: {:?}", config);

    match cli.command {
        Commands::Translate { sql, file, dialect } => {
            debug!("Running TRANSLATE command");
            let mut config = config;
            if let Some(name) = dialect {
                config.database.driver = Some(name);
            }
            // ad-hoc translation skips the configured statement check
            config.preflight.statements.clear();

            let translator = Translator::from_config(&config).unwrap_or_else(|e| {
                error!("Failed to build translator: {}", e);
                std::process::exit(1);
            });

            let statements = match (sql, file) {
                (Some(sql), _) => vec![sql],
                (None, Some(path)) => StatementLoader::load(&path).unwrap_or_else(|e| {
                    error!("Failed to read '{}': {}", path, e);
                    std::process::exit(1);
                }),
                (None, None) => {
                    let mut input = String::new();
                    if let Err(e) = io::stdin().read_to_string(&mut input) {
                        error!("Failed to read stdin: {}", e);
                        std::process::exit(1);
                    }
                    StatementLoader::split_sql_statements(&input)
                }
            };

            for statement in &statements {
                if statements.len() > 1 {
                    println!("{};", translator.translate(statement));
                } else {
                    println!("{}", translator.translate(statement));
                }
            }
        }

        Commands::Check { path } => {
            info!("Running CHECK command");
            let paths = if path.is_empty() {
                config.preflight.statements.clone()
            } else {
                path
            };
            if paths.is_empty() {
                error!("No statement files given via --path or preflight.statements");
                std::process::exit(1);
            }

            let registry = ConflictRegistry::with_builtin(config.conflicts.clone())
                .unwrap_or_else(|e| {
                    error!("Invalid conflict registry: {}", e);
                    std::process::exit(1);
                });

            let mut statements = Vec::new();
            for p in &paths {
                match StatementLoader::load(p) {
                    Ok(loaded) => statements.extend(loaded),
                    Err(e) => {
                        error!("Failed to load statements from '{}': {}", p, e);
                        std::process::exit(1);
                    }
                }
            }

            let issues = check_statements(&registry, statements.iter().map(String::as_str));
            if issues.is_empty() {
                info!("All {} statements are safe to translate", statements.len());
            } else {
                for issue in &issues {
                    error!("{}", issue);
                }
                error!("{} upsert statement(s) need a conflict key", issues.len());
                std::process::exit(1);
            }
        }

        Commands::Rules { dialect } => {
            debug!("Running RULES command");
            let dialects: Vec<Dialect> = match dialect {
                Some(name) => match name.parse() {
                    Ok(d) => vec![d],
                    Err(e) => {
                        error!("{} (available: {})", e, list_dialects().join(", "));
                        std::process::exit(1);
                    }
                },
                None => vec![Dialect::Sqlite, Dialect::Postgres],
            };

            for d in dialects {
                println!("[{}]", d);
                for (i, rule) in d.rules().iter().enumerate() {
                    println!("{:>3}. {}", i + 1, rule.rule());
                }
                if d.numbers_placeholders() {
                    println!("  +  ? -> $n placeholders");
                }
                println!();
            }

            match ConflictRegistry::with_builtin(config.conflicts) {
                Ok(registry) => {
                    println!("[conflicts]");
                    for entry in registry.entries() {
                        println!("  {} -> ({})", entry.table, entry.columns);
                    }
                }
                Err(e) => {
                    error!("Invalid conflict registry: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Exec { sql, conn, args } => {
            info!("Running EXEC command");
            let final_conn = conn
                .or_else(|| config.database.connection_string.clone())
                .unwrap_or_else(|| {
                    error!("No connection string provided via --conn flag or config file");
                    std::process::exit(1);
                });

            let translator = Translator::from_config(&config).unwrap_or_else(|e| {
                error!("Failed to build translator: {}", e);
                std::process::exit(1);
            });
            let args: Vec<Value> = args.into_iter().map(Value::Text).collect();

            if let Err(e) = run_exec(translator, &final_conn, &sql, &args) {
                error!("Exec command failed: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Config { output } => {
            info!("Running CONFIG command");
            match Config::generate_default_config(&output) {
                Ok(()) => {
                    info!("Generated default configuration file: {}", output);
                    if let Some(env_name) = cli.env {
                        let env_path = format!("config/{}.toml", env_name);
                        match std::fs::create_dir_all("config") {
                            Ok(()) => match Config::generate_default_config(&env_path) {
                                Ok(()) => info!("Generated environment configuration file: {}", env_path),
                                Err(e) => error!("Failed to create environment config: {}", e),
                            },
                            Err(e) => error!("Failed to create config directory: {}", e),
                        }
                    }
                }
                Err(e) => {
                    error!("Failed to generate configuration file: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn run_exec(
    translator: Translator,
    conn: &str,
    sql: &str,
    args: &[Value],
) -> Result<(), Box<dyn std::error::Error>> {
    let manager = ConnectionManager::new()?;
    let db = Preflight::new(translator, manager.open(conn)?);
    debug!("Translated: {}", db.translator().translate(sql));

    if returns_rows(sql) {
        let rows = db.query(sql, args)?;
        for row in &rows {
            let cells: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("NULL")).collect();
            println!("{}", cells.join("\t"));
        }
        info!("{} rows", rows.len());
    } else {
        db.execute(sql, args)?;
        info!("Statement executed");
    }

    Ok(())
}

fn returns_rows(sql: &str) -> bool {
    let head = sql.trim_start().to_uppercase();
    ["SELECT", "WITH", "SHOW", "PRAGMA", "EXPLAIN"]
        .iter()
        .any(|kw| head.starts_with(kw))
}
