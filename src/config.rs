use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:4221";
pub const DEFAULT_WORKERS: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no storage directory configured (pass --directory)")]
    MissingDirectory,
    #[error("worker count must be at least 1")]
    NoWorkers,
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Command-line flags.
#[derive(Debug, Default, Parser)]
#[command(name = "courier", about = "HTTP/1.1 echo and file server")]
pub struct Args {
    /// Directory files are served from and written to
    #[arg(long)]
    pub directory: Option<PathBuf>,

    /// YAML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    pub listen: Option<String>,

    /// Number of connection workers
    #[arg(long)]
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            workers: DEFAULT_WORKERS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub directory: PathBuf,
}

/// Partial config as it appears in a file; every section is optional so
/// the storage directory may come from the command line instead.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    server: ServerConfig,
    storage: Option<StorageConfig>,
}

impl Config {
    /// Loads configuration from the process arguments, an optional config
    /// file, and the `LISTEN` environment variable, in increasing precedence.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = Self::from_args(Args::parse())?;

        if let Ok(listen_addr) = std::env::var("LISTEN") {
            cfg.server.listen_addr = listen_addr;
        }

        Ok(cfg)
    }

    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                serde_yaml::from_str(&raw)?
            }
            None => FileConfig::default(),
        };

        let mut server = file.server;
        if let Some(listen_addr) = args.listen {
            server.listen_addr = listen_addr;
        }
        if let Some(workers) = args.workers {
            server.workers = workers;
        }

        let directory = args
            .directory
            .or_else(|| file.storage.map(|s| s.directory))
            .ok_or(ConfigError::MissingDirectory)?;

        let cfg = Self {
            server,
            storage: StorageConfig { directory },
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_yaml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }
}
