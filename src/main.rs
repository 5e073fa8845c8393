mod cli;

use gamecrit::config::{self, DatabaseConfig};
use gamecrit::db::{pool, schema};
use gamecrit::status::CatalogStatus;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "gamecrit=debug,gamecrit_db=debug".to_string()
        } else {
            "gamecrit=info,gamecrit_db=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => {
            let db = database_config(cli.config.as_deref(), cli.database)?;
            init(&db)
        }
        Commands::Status { json } => {
            let db = database_config(cli.config.as_deref(), cli.database)?;
            status(&db, json)
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("gamecrit {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Resolve database settings from the config file and the `--database` flag.
fn database_config(config_path: Option<&Path>, database: Option<PathBuf>) -> Result<DatabaseConfig> {
    let mut config = config::load_config_or_default(config_path)?;
    if let Some(path) = database {
        config.database.path = path;
    }
    Ok(config.database)
}

fn init(db: &DatabaseConfig) -> Result<()> {
    let path = db.effective_path();
    tracing::info!("Initializing catalog at {}", path.display());

    let conn = pool::open_connection(db)?;
    let created = schema::create_all(&conn)
        .with_context(|| format!("Failed to create tables in {}", path.display()))?;

    if created == 0 {
        println!("All catalog tables already exist in {}", path.display());
    } else {
        println!("Created {} tables in {}", created, path.display());
    }
    Ok(())
}

fn status(db: &DatabaseConfig, json: bool) -> Result<()> {
    let path = db.effective_path();
    let conn = pool::open_read_only(db)?;
    let status = CatalogStatus::collect(&conn, &path)
        .with_context(|| format!("Failed to inspect {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("{}", status);
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(path)?;

    println!("Configuration is valid");
    println!("  Database: {}", config.database.effective_path().display());
    println!("  Pool size: {}", config.database.pool_size);
    println!("  Busy timeout: {} ms", config.database.busy_timeout_ms);

    let warnings = config.validate();
    if !warnings.is_empty() {
        println!("Warnings:");
        for warning in warnings {
            println!("  - {}", warning);
        }
    }

    Ok(())
}
