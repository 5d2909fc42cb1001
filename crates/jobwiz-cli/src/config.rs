//! Configuration file management for jobwiz.
//!
//! Provides a TOML-based config file at `~/.config/jobwiz/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use jobwiz_core::DEFAULT_WORKER_BINARY;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub worker: WorkerSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkerSection {
    /// Path or name of the worker binary.
    pub binary: String,
    /// Where to place the capture file; defaults to the temp directory.
    pub capture_path: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the jobwiz config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/jobwiz` or `~/.config/jobwiz`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("jobwiz");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("jobwiz")
}

/// Return the path to the jobwiz config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default capture file location.
///
/// One well-known name in the temp directory: two jobwiz processes
/// sharing it are last-writer-wins, so point concurrent clients at
/// distinct paths via `--capture`.
pub fn default_capture_path() -> PathBuf {
    std::env::temp_dir().join("jobwiz_output.txt")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    Ok(())
}

/// Execute the `jobwiz init` command: write the config file.
pub fn cmd_init(worker: &str, capture: Option<&str>, force: bool) -> Result<()> {
    let path = config_path();

    if path.exists() && !force {
        bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = ConfigFile {
        worker: WorkerSection {
            binary: worker.to_string(),
            capture_path: capture.map(str::to_string),
        },
    };

    save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  worker.binary = {worker}");
    println!(
        "  worker.capture_path = {}",
        cfg.worker
            .capture_path
            .as_deref()
            .unwrap_or("(default: temp directory)")
    );

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct JobwizConfig {
    pub binary: String,
    pub capture_path: PathBuf,
}

impl JobwizConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config
    /// file > default.
    ///
    /// - Worker binary: `cli_worker` > `JOBWIZ_WORKER` env >
    ///   `config_file.worker.binary` > `job_wizard` on `$PATH`.
    /// - Capture path: `cli_capture` > `JOBWIZ_CAPTURE` env >
    ///   `config_file.worker.capture_path` > temp directory.
    pub fn resolve(cli_worker: Option<&str>, cli_capture: Option<&str>) -> Self {
        let file_config = load_config().ok();

        let binary = if let Some(worker) = cli_worker {
            worker.to_string()
        } else if let Ok(worker) = std::env::var("JOBWIZ_WORKER") {
            worker
        } else if let Some(ref cfg) = file_config {
            cfg.worker.binary.clone()
        } else {
            DEFAULT_WORKER_BINARY.to_string()
        };

        let capture_path = if let Some(capture) = cli_capture {
            PathBuf::from(capture)
        } else if let Ok(capture) = std::env::var("JOBWIZ_CAPTURE") {
            PathBuf::from(capture)
        } else if let Some(capture) = file_config
            .as_ref()
            .and_then(|cfg| cfg.worker.capture_path.as_deref())
        {
            PathBuf::from(capture)
        } else {
            default_capture_path()
        };

        Self {
            binary,
            capture_path,
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
