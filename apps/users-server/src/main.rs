use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;
use users::infra::db::{self, ConnectOpts};
use users::{UsersModule, UsersModuleConfig};

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps in-memory DSNs as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
/// - Adds `mode=rwc` when no mode is given so a missing file is created.
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if db::is_sqlite_memory(dsn) {
        return Ok(dsn.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)?;
        }
    }

    // Rebuild DSN with absolute path and normalized slashes
    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    match query {
        Some(q) if q.split('&').any(|kv| kv.starts_with("mode=")) => {
            out.push('?');
            out.push_str(q);
        }
        Some(q) => {
            out.push('?');
            out.push_str(q);
            out.push_str("&mode=rwc");
        }
        None => out.push_str("?mode=rwc"),
    }
    Ok(out)
}

/// Users Server - CRUD HTTP/JSON service for user records
#[derive(Parser)]
#[command(name = "users-server")]
#[command(about = "Users Server - CRUD HTTP/JSON service for user records")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use a private in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    // Print config and exit if requested
    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Users Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

/// Only SQLite is linked into this build.
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" => Ok("sqlite"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// Final DSN handed to the pool: validated, relative SQLite paths resolved
/// against `home_dir`.
fn resolve_dsn(db_config: &DatabaseConfig, base_dir: &Path, create_dirs: bool) -> Result<String> {
    detect_from_dsn(db_config)?;
    absolutize_sqlite_dsn(db_config.url.trim(), base_dir, create_dirs)
}

async fn run_server(config: AppConfig) -> Result<()> {
    let db_config = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("No database configuration found"))?;
    let base_dir = PathBuf::from(&config.server.home_dir);
    let dsn = resolve_dsn(&db_config, &base_dir, true)?;

    let connect_opts = ConnectOpts {
        max_conns: db_config.max_conns,
        acquire_timeout: db_config.acquire_timeout_sec.map(Duration::from_secs),
        busy_timeout: db_config.busy_timeout_ms.map(Duration::from_millis),
    };

    tracing::info!("Connecting to database: {}", dsn);
    let pools = db::connect(&dsn, connect_opts).await?;

    let module_config = UsersModuleConfig {
        timeout_sec: config.server.timeout_sec,
        body_limit_bytes: config.server.body_limit_bytes,
        cors_enabled: config.server.cors_enabled,
    };
    let module = UsersModule::init(pools, module_config).await?;
    let app = module.router();

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow!("failed to bind {}: {}", addr, e))?;
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = runtime::shutdown::wait_for_shutdown().await {
                tracing::error!("shutdown signal handler failed: {e:#}");
            }
        })
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let Some(db_config) = &config.database {
        let dsn = resolve_dsn(db_config, Path::new(&config.server.home_dir), false)?;
        tracing::info!("Database DSN: {}", dsn);
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);

    Ok(())
}
