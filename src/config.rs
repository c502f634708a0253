use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "campus-social", about = "Anonymous campus social client")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Simulated backend latency in milliseconds
    #[arg(long)]
    pub latency_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Walk through register, verify, post, comment and like
    Demo {
        /// Institutional email to register with
        #[arg(long, default_value = "demo@krct.ac.in")]
        email: String,
    },
    /// Show the persisted session
    Whoami,
    /// List or update persisted notifications
    Notifications {
        #[arg(long)]
        read: Option<String>,
        #[arg(long)]
        read_all: bool,
        #[arg(long)]
        clear: bool,
    },
    /// List trending and custom hashtags
    Hashtags {
        /// Add a custom hashtag
        #[arg(long)]
        add: Option<String>,
        /// Search the picker suggestions
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub backend: BackendConfig,
    pub community: CommunityConfig,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub latency_ms: u64,
    pub init_attempts: u32,
    pub hash_cost: u32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CommunityConfig {
    pub email_domain: String,
    pub share_base_url: String,
    pub min_password_len: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            latency_ms: 1500,
            init_attempts: 3,
            hash_cost: 10,
        }
    }
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            email_domain: "krct.ac.in".to_string(),
            share_base_url: "https://krct.social".to_string(),
            min_password_len: 6,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli)?;
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(latency) = cli.latency_ms {
            config.backend.latency_ms = latency;
        }

        if config.storage.path.is_none() {
            config.storage.path = Some(data_dir.join("campus-social.db"));
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> anyhow::Result<PathBuf> {
        match &cli.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::home_dir()
                .map(|home| home.join(".campus-social"))
                .ok_or_else(|| anyhow::anyhow!("Could not determine home directory")),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.storage
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("campus-social.db"))
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.backend.latency_ms)
    }
}
