// Server configuration: CLI flags layered over an optional YAML file

use clap::{Parser, ValueEnum};
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_BIND: &str = "127.0.0.1:8081";

/// Which storage backend the server runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreMode {
    /// Volatile, lost on exit
    InMem,
    /// Persisted to a JSON file
    JsonStore,
}

#[derive(Debug, Parser)]
#[command(name = "todostore")]
#[command(about = "Todo record service with in-memory or JSON file storage")]
#[command(version)]
pub struct Cli {
    /// Storage backend to run with
    #[arg(short, long, value_enum)]
    pub mode: Option<StoreMode>,

    /// Path of the JSON file used by json-store mode
    #[arg(short, long = "json")]
    pub json_path: Option<PathBuf>,

    /// Address to listen on (default: 127.0.0.1:8081)
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,

    /// YAML file providing defaults for the options above
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Contents of the YAML config file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub mode: Option<StoreMode>,
    pub json_path: Option<PathBuf>,
    pub bind: Option<SocketAddr>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Fully resolved backend choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    InMem,
    Json(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub backend: Backend,
}

impl ServerConfig {
    /// Resolve CLI flags, reading the config file they point at if any
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    /// Merge CLI flags over file values; CLI wins
    pub fn resolve(cli: Cli, file: FileConfig) -> Result<Self> {
        let mode = cli
            .mode
            .or(file.mode)
            .ok_or_else(|| eyre!("no valid mode provided to start server with datastore (use --mode)"))?;

        let bind = match cli.bind.or(file.bind) {
            Some(addr) => addr,
            None => DEFAULT_BIND.parse().context("Invalid default bind address")?,
        };

        let backend = match mode {
            StoreMode::InMem => Backend::InMem,
            StoreMode::JsonStore => {
                let path = match cli.json_path.or(file.json_path) {
                    Some(path) => path,
                    None => default_json_path()?,
                };
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    return Err(eyre!("no valid path to json file provided: {}", path.display()));
                }
                Backend::Json(path)
            }
        };

        Ok(Self { bind, backend })
    }
}

/// `<data dir>/todostore/todos.json`
pub fn default_json_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| eyre!("Could not determine data directory, pass --json"))?;
    Ok(data_dir.join("todostore").join("todos.json"))
}
