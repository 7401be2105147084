//! Startup configuration
//!
//! Values come from an optional JSON file and from the command line; flags
//! win over the file and admin lists are merged.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use directories::ProjectDirs;
use mafia_core::AdminList;
use serde::Deserialize;

const DEFAULT_REFRESH_MS: u64 = 1000;

#[derive(Debug, Parser)]
#[command(name = "mafia-bot", version, about = "Mafia game moderator bot")]
pub struct Cli {
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Chat platform bot token
    #[arg(long)]
    pub token: Option<String>,

    /// Administrator username, may be repeated
    #[arg(long = "admin")]
    pub admins: Vec<String>,

    /// Directory of scenario documents loaded at startup
    #[arg(long)]
    pub scenarios: Option<PathBuf>,

    /// Refresh period of tracked room lists in milliseconds
    #[arg(long)]
    pub refresh_ms: Option<u64>,

    /// Seed for role dealing; defaults to the current time
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub token: Option<String>,
    pub admins: Vec<String>,
    pub scenarios: Option<PathBuf>,
    pub refresh_ms: Option<u64>,
    pub seed: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

/// Resolved settings the bot runs with
#[derive(Debug)]
pub struct Settings {
    pub token: String,
    pub admins: AdminList,
    pub scenarios_dir: Option<PathBuf>,
    pub refresh: Duration,
    pub seed: u64,
}

impl Settings {
    /// Read the config file named on the command line, or the default one
    /// if it exists, and merge the flags over it
    pub fn load(cli: Cli) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => FileConfig::load(&path)?,
                _ => FileConfig::default(),
            },
        };
        Self::merge(cli, file)
    }

    pub fn merge(cli: Cli, file: FileConfig) -> anyhow::Result<Self> {
        let token = match cli.token.or(file.token) {
            Some(token) if !token.trim().is_empty() => token,
            _ => bail!("no bot token configured; pass --token or set \"token\" in the config file"),
        };

        let admins = AdminList::new(file.admins.iter().chain(cli.admins.iter()));
        let scenarios_dir = cli
            .scenarios
            .or(file.scenarios)
            .or_else(|| ProjectDirs::from("dev", "mafia", "mafia-bot").map(|d| d.data_dir().join("scenarios")));
        let refresh_ms = cli.refresh_ms.or(file.refresh_ms).unwrap_or(DEFAULT_REFRESH_MS).max(1);
        let seed = cli.seed.or(file.seed).unwrap_or_else(clock_seed);

        Ok(Self {
            token,
            admins,
            scenarios_dir,
            refresh: Duration::from_millis(refresh_ms),
            seed,
        })
    }

    /// Short digest of the token, safe to log
    pub fn token_fingerprint(&self) -> String {
        sha256::digest(self.token.as_str())[..12].to_string()
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "mafia", "mafia-bot").map(|dirs| dirs.config_dir().join("config.json"))
}

fn clock_seed() -> u64 {
    let now = chrono::Utc::now();
    now.timestamp_nanos_opt()
        .map(|nanos| nanos as u64)
        .unwrap_or_else(|| now.timestamp_micros() as u64)
}
