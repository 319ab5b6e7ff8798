use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::constants::DEFAULT_LOG_FILE_NAME;
use crate::store::StoreSettings;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding the log; empty selects the platform data dir.
    #[serde(default)]
    pub data_dir: String,
    #[serde(default = "default_log_file_name")]
    pub log_file_name: String,
    #[serde(default)]
    pub sync_appends: bool,
    #[serde(default = "default_true")]
    pub sync_rewrites: bool,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub config_hash: String,
}

pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig> {
    let bytes: Vec<u8> = if let Some(p) = path {
        std::fs::read(p).with_context(|| format!("read config {}", p.display()))?
    } else {
        include_bytes!("../config/default.yml").to_vec()
    };

    let mut config: Config = serde_yaml::from_slice(&bytes)?;
    if config.log_file_name.trim().is_empty() {
        config.log_file_name = default_log_file_name();
    }

    let config_hash = hash_bytes(&bytes);

    Ok(LoadedConfig {
        config,
        config_hash,
    })
}

impl Config {
    /// Resolves the log path. `data_dir_override` (from the command line)
    /// wins over `data_dir`, which wins over the platform data dir.
    pub fn log_path(&self, data_dir_override: Option<&Path>) -> Result<PathBuf> {
        let dir = match data_dir_override {
            Some(dir) => dir.to_path_buf(),
            None if !self.data_dir.trim().is_empty() => PathBuf::from(self.data_dir.trim()),
            None => dirs::data_local_dir()
                .map(|dir| dir.join("visitlog"))
                .ok_or_else(|| anyhow!("no data directory available; pass --data-dir"))?,
        };
        Ok(dir.join(&self.log_file_name))
    }

    pub fn store_settings(&self, data_dir_override: Option<&Path>) -> Result<StoreSettings> {
        Ok(StoreSettings {
            path: self.log_path(data_dir_override)?,
            sync_appends: self.sync_appends,
            sync_rewrites: self.sync_rewrites,
        })
    }
}

fn default_log_file_name() -> String {
    DEFAULT_LOG_FILE_NAME.to_string()
}

fn default_true() -> bool {
    true
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    hex::encode(digest)
}
