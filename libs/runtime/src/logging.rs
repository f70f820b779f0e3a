use crate::config::{LoggingConfig, Section};
use std::{
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::{
    filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

// -------- level helpers --------
fn parse_tracing_level(s: &str) -> Option<Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

fn level_filter(s: &str) -> LevelFilter {
    parse_tracing_level(s)
        .map(LevelFilter::from_level)
        .unwrap_or(LevelFilter::OFF)
}

// -------- rotating writer for files --------
#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl<'a> fmt::MakeWriter<'a> for RotWriter {
    type Writer = RotWriterHandle;
    fn make_writer(&'a self) -> Self::Writer {
        RotWriterHandle(self.0.clone())
    }
}

struct RotWriterHandle(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log writer poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log writer poisoned"))?
            .flush()
    }
}

// -------- path resolution helpers --------

/// Absolute paths are kept as-is; relative paths are joined with `base_dir`.
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Create a size-rotated writer, making sure the parent directory exists.
fn create_rotating_writer_at_path(
    log_path: &Path,
    max_bytes: usize,
    max_files: usize,
) -> std::io::Result<RotWriter> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(FileLimit::MaxFiles(max_files)),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

fn section_writer(name: &str, section: &Section, base_dir: &Path) -> Option<RotWriter> {
    if section.file.trim().is_empty() {
        return None;
    }

    let max_bytes = section.max_size_mb.unwrap_or(100) * 1024 * 1024;
    let max_files = section.max_backups.unwrap_or(3);
    let log_path = resolve_log_path(&section.file, base_dir);

    match create_rotating_writer_at_path(&log_path, max_bytes as usize, max_files) {
        Ok(writer) => Some(writer),
        Err(e) => {
            eprintln!(
                "Failed to init log file for '{}': {} ({})",
                name,
                log_path.to_string_lossy(),
                e
            );
            None
        }
    }
}

// -------- filters --------

/// Console filter: explicit subsystems use their own level, everything else
/// falls back to the "default" section.
fn build_console_targets(cfg: &LoggingConfig) -> Targets {
    let default = cfg
        .get("default")
        .map(|s| level_filter(&s.console_level))
        .unwrap_or(LevelFilter::OFF);

    cfg.iter()
        .filter(|(name, _)| name.as_str() != "default")
        .fold(Targets::new().with_default(default), |t, (name, s)| {
            t.with_target(name.clone(), level_filter(&s.console_level))
        })
}

/// File filter for one section. The "default" file receives every target
/// that is not claimed by an explicit subsystem section.
fn build_file_targets(cfg: &LoggingConfig, name: &str, section: &Section) -> Targets {
    let level = level_filter(&section.file_level);
    if name != "default" {
        return Targets::new().with_target(name.to_string(), level);
    }

    cfg.keys()
        .filter(|k| k.as_str() != "default")
        .fold(Targets::new().with_default(level), |t, k| {
            t.with_target(k.clone(), LevelFilter::OFF)
        })
}

// -------- public init --------

/// Initialize logging from a configuration.
/// - `cfg`: subsystem sections, "default" being the catch-all
/// - `base_dir`: directory used to resolve relative log file paths (server.home_dir)
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` → `tracing` before installing the subscriber (sqlx, sea-orm).
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let _ = tracing_subscriber::registry()
        .with(build_layers(cfg, base_dir))
        .try_init();
}

fn init_default_logging() {
    let _ = fmt()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

fn build_layers(cfg: &LoggingConfig, base_dir: &Path) -> Vec<BoxedLayer> {
    let ansi = std::io::stdout().is_terminal();
    let mut layers: Vec<BoxedLayer> = Vec::new();

    layers.push(
        fmt::layer()
            .with_ansi(ansi)
            .with_target(true)
            .with_level(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_filter(build_console_targets(cfg))
            .boxed(),
    );

    for (name, section) in cfg {
        let Some(writer) = section_writer(name, section, base_dir) else {
            continue;
        };
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(writer)
                .with_filter(build_file_targets(cfg, name, section))
                .boxed(),
        );
    }

    layers
}

// =================== tests ===================
