use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::transfer;
use crate::location::Location;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub device_name: String,
    pub data_dir: PathBuf,
    pub requested_mtu: u16,
    pub chunk_size: usize,
    /// Fixed position appended to outgoing messages
    pub location: Option<Location>,
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_name: "BleChat".to_string(),
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("blechat"),
            requested_mtu: transfer::REQUESTED_MTU,
            chunk_size: transfer::CHUNK_SIZE,
            location: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chunk_size == 0 {
            anyhow::bail!("Chunk size must be greater than zero");
        }
        if self.chunk_size + transfer::ATT_HEADER_SIZE > self.requested_mtu as usize {
            tracing::warn!(
                "Chunk size {} does not fit the requested MTU {}",
                self.chunk_size,
                self.requested_mtu
            );
        }
        Ok(())
    }
}
