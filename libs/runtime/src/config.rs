use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::paths::resolve_home_dir;

const DEFAULT_SUBDIR: &str = ".users-service";

/// Application configuration: server, database and logging sections.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Database configuration (optional; the server refuses to start without it).
    pub database: Option<DatabaseConfig>,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub home_dir: String, // normalized to an absolute path on load
    pub host: String,
    pub port: u16,
    /// Per-request handler timeout; 0 disables the timeout layer.
    #[serde(default)]
    pub timeout_sec: u64,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
    #[serde(default)]
    pub cors_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection URL, e.g. "sqlite://database/users.db" or "sqlite::memory:".
    pub url: String,
    /// Maximum number of pooled connections (defaults to 10).
    pub max_conns: Option<u32>,
    /// Seconds to wait for a free pooled connection (defaults to 5).
    pub acquire_timeout_sec: Option<u64>,
    /// SQLite `busy_timeout` in milliseconds for file databases (defaults to 5000).
    pub busy_timeout_ms: Option<u64>,
}

/// Subsystem name → logging section. Key "default" catches every target that
/// no explicit section claims.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub console_level: String, // "info", "debug", "error", "off"
    #[serde(default)]
    pub file: String, // "logs/users.log"; empty disables the file sink
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // Empty => $HOME/.users-service
            home_dir: String::new(),
            host: "127.0.0.1".to_string(),
            port: 8087,
            timeout_sec: 30,
            body_limit_bytes: default_body_limit(),
            cors_enabled: false,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://database/users.db".to_string(),
            max_conns: Some(10),
            acquire_timeout_sec: Some(5),
            busy_timeout_ms: Some(5000),
        }
    }
}

/// Create a default logging configuration.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/users.log".to_string(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: Some(DatabaseConfig::default()),
            logging: Some(default_logging_config()),
        }
    }
}

impl AppConfig {
    /// Layered loading: defaults → YAML file → `APP__`-prefixed environment.
    /// `server.home_dir` is normalized to an absolute path and created.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let path = config_path.as_ref();
        if !path.is_file() {
            anyhow::bail!("config file not found: {}", path.display());
        }

        // Optional sections stay None unless the file or the environment sets them.
        let base = AppConfig {
            server: ServerConfig::default(),
            database: None,
            logging: None,
        };

        let figment = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(path))
            // APP__SERVER__PORT=8087 maps to server.port
            .merge(Env::prefixed("APP__").split("__"));

        let mut config: AppConfig = figment
            .extract()
            .with_context(|| format!("failed to parse yaml config {}", path.display()))?;

        normalize_home_dir_inplace(&mut config.server)
            .context("failed to resolve server.home_dir")?;

        Ok(config)
    }

    /// Load from a file when given, otherwise use defaults.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let mut c = Self::default();
                normalize_home_dir_inplace(&mut c.server)
                    .context("failed to resolve server.home_dir (defaults)")?;
                Ok(c)
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to serialize config to YAML")
    }

    /// Apply overrides from command line arguments.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if args.mock {
            let db = self.database.get_or_insert_with(DatabaseConfig::default);
            db.url = "sqlite::memory:".to_string();
        }

        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(default_section) = logging.get_mut("default") {
            match args.verbose {
                0 => {}
                1 => default_section.console_level = "debug".to_string(),
                _ => default_section.console_level = "trace".to_string(),
            }
        }
    }

    /// Socket address string for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Command line arguments relevant to configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
    pub mock: bool,
}

fn normalize_home_dir_inplace(server: &mut ServerConfig) -> Result<()> {
    let opt = if server.home_dir.trim().is_empty() {
        None
    } else {
        Some(server.home_dir.clone())
    };

    let resolved: PathBuf = resolve_home_dir(opt, DEFAULT_SUBDIR, true)?;
    server.home_dir = resolved.to_string_lossy().to_string();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_structure() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8087);
        assert_eq!(config.server.home_dir, "");
        assert_eq!(config.server.timeout_sec, 30);
        assert!(!config.server.cors_enabled);

        let db = config.database.as_ref().unwrap();
        assert_eq!(db.url, "sqlite://database/users.db");
        assert_eq!(db.max_conns, Some(10));
        assert_eq!(db.acquire_timeout_sec, Some(5));
        assert_eq!(db.busy_timeout_ms, Some(5000));

        let logging = config.logging.as_ref().unwrap();
        assert_eq!(logging["default"].console_level, "info");
        assert_eq!(logging["default"].file, "logs/users.log");
    }

    #[test]
    fn test_load_layered_reads_yaml_and_normalizes_home_dir() {
        let tmp = tempdir().unwrap();
        let home = tmp.path().join("home");
        let cfg_path = tmp.path().join("cfg.yaml");

        let yaml = format!(
            r#"
server:
  home_dir: "{}"
  host: "0.0.0.0"
  port: 9090
  timeout_sec: 5
  cors_enabled: true

database:
  url: "sqlite://users-test.db"
  max_conns: 2

logging:
  default:
    console_level: debug
    file: "logs/default.log"
"#,
            home.to_string_lossy().replace('\\', "/")
        );
        fs::write(&cfg_path, yaml).unwrap();

        let config = AppConfig::load_layered(&cfg_path).unwrap();

        assert!(Path::new(&config.server.home_dir).is_absolute());
        assert!(home.is_dir());
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.timeout_sec, 5);
        assert!(config.server.cors_enabled);
        assert_eq!(config.server.body_limit_bytes, 1024 * 1024);

        let db = config.database.as_ref().unwrap();
        assert_eq!(db.url, "sqlite://users-test.db");
        assert_eq!(db.max_conns, Some(2));
        assert_eq!(db.acquire_timeout_sec, None);
        assert_eq!(db.busy_timeout_ms, None);

        let logging = config.logging.as_ref().unwrap();
        assert_eq!(logging["default"].console_level, "debug");
        assert_eq!(logging["default"].file_level, "");
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");
        fs::write(
            &cfg_path,
            format!(
                "server:\n  home_dir: \"{}\"\n  host: h\n  port: 1\n  bogus: true\n",
                tmp.path().to_string_lossy().replace('\\', "/")
            ),
        )
        .unwrap();

        assert!(AppConfig::load_layered(&cfg_path).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = AppConfig::load_layered("/nonexistent/users.yaml").unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = AppConfig::default();
        let args = CliArgs {
            port: Some(1234),
            verbose: 2,
            mock: true,
            ..Default::default()
        };
        config.apply_cli_overrides(&args);

        assert_eq!(config.server.port, 1234);
        assert_eq!(config.database.as_ref().unwrap().url, "sqlite::memory:");
        assert_eq!(
            config.logging.as_ref().unwrap()["default"].console_level,
            "trace"
        );
        assert_eq!(config.bind_addr(), "127.0.0.1:1234");
    }

    #[test]
    fn test_yaml_roundtrip_keeps_sections() {
        let yaml = AppConfig::default().to_yaml().unwrap();
        assert!(yaml.contains("server:"));
        assert!(yaml.contains("database:"));
        assert!(yaml.contains("logging:"));
    }
}
