use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sea_orm::sqlx::{self, ConnectOptions as _};
use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::infra::storage::migrations::Migrator;

/// Keeps the single in-memory connection from being reaped.
const MEMORY_CONN_LIFETIME: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// How long a file connection waits on another connection's lock.
pub const DEFAULT_SQLITE_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Pool settings for [`connect`].
#[derive(Debug, Clone)]
pub struct ConnectOpts {
    pub max_conns: Option<u32>,
    pub acquire_timeout: Option<Duration>,
    /// `PRAGMA busy_timeout` for file databases.
    pub busy_timeout: Option<Duration>,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            acquire_timeout: Some(Duration::from_secs(5)),
            busy_timeout: Some(DEFAULT_SQLITE_BUSY_TIMEOUT),
        }
    }
}

/// Connection pools for one database.
///
/// SQLite admits a single writer at a time, and a deferred transaction that
/// reads before it writes cannot wait for that lock. Every write transaction
/// therefore runs on `writer`, a pool of exactly one connection, while plain
/// reads go through `reader`.
#[derive(Debug, Clone)]
pub struct DbPools {
    pub reader: DatabaseConnection,
    pub writer: DatabaseConnection,
}

/// True for DSNs that name a private in-memory SQLite database.
pub fn is_sqlite_memory(dsn: &str) -> bool {
    dsn.starts_with("sqlite:") && (dsn.contains(":memory:") || dsn.contains("mode=memory"))
}

/// Open the pools for `dsn`.
///
/// Every connection to an in-memory SQLite database gets its own empty
/// database, so there a single long-lived connection serves as both reader
/// and writer. File databases run in WAL mode so readers never block the
/// writer.
pub async fn connect(dsn: &str, opts: ConnectOpts) -> anyhow::Result<DbPools> {
    let conn_opts = SqliteConnectOptions::from_str(dsn)
        .with_context(|| format!("invalid sqlite DSN '{dsn}'"))?
        .disable_statement_logging();

    if is_sqlite_memory(dsn) {
        let pool = pool_options(&opts)
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(MEMORY_CONN_LIFETIME)
            .max_lifetime(MEMORY_CONN_LIFETIME)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA journal_mode = DELETE")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect_with(conn_opts)
            .await
            .with_context(|| format!("failed to connect to database '{dsn}'"))?;
        let conn = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
        return Ok(DbPools {
            reader: conn.clone(),
            writer: conn,
        });
    }

    let busy_timeout = opts.busy_timeout.unwrap_or(DEFAULT_SQLITE_BUSY_TIMEOUT);

    // The writer opens first so `mode=rwc` creates the file before readers attach.
    let writer = with_file_pragmas(pool_options(&opts).max_connections(1), busy_timeout)
        .connect_with(conn_opts.clone())
        .await
        .with_context(|| format!("failed to open writer connection to '{dsn}'"))?;

    let mut reader = pool_options(&opts);
    if let Some(n) = opts.max_conns {
        reader = reader.max_connections(n);
    }
    let reader = with_file_pragmas(reader, busy_timeout)
        .connect_with(conn_opts)
        .await
        .with_context(|| format!("failed to connect to database '{dsn}'"))?;

    Ok(DbPools {
        reader: SqlxSqliteConnector::from_sqlx_sqlite_pool(reader),
        writer: SqlxSqliteConnector::from_sqlx_sqlite_pool(writer),
    })
}

fn pool_options(opts: &ConnectOpts) -> SqlitePoolOptions {
    let mut o = SqlitePoolOptions::new();
    if let Some(t) = opts.acquire_timeout {
        o = o.acquire_timeout(t);
    }
    o
}

fn with_file_pragmas(o: SqlitePoolOptions, busy_timeout: Duration) -> SqlitePoolOptions {
    let busy_ms = i64::try_from(busy_timeout.as_millis()).unwrap_or(i64::MAX);
    o.after_connect(move |conn, _meta| {
        Box::pin(async move {
            sqlx::query("PRAGMA journal_mode = WAL")
                .execute(&mut *conn)
                .await?;
            sqlx::query("PRAGMA synchronous = NORMAL")
                .execute(&mut *conn)
                .await?;
            let stmt = format!("PRAGMA busy_timeout = {busy_ms}");
            sqlx::query(&stmt).execute(&mut *conn).await?;
            Ok(())
        })
    })
}

/// Apply pending schema migrations.
pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
    info!("Running users database migrations");
    Migrator::up(db, None)
        .await
        .context("users migrations failed")?;
    info!("Users database migrations completed");
    Ok(())
}

/// Fresh migrated in-memory database; used by the tests and `--mock`.
pub async fn connect_in_memory() -> anyhow::Result<DbPools> {
    let pools = connect("sqlite::memory:", ConnectOpts::default()).await?;
    migrate(&pools.writer).await?;
    Ok(pools)
}
