//! Server configuration read from the environment

use anyhow::Context;
use std::net::SocketAddr;
use std::path::PathBuf;

use taskkit_core::task::{ReorderMode, TaskStoreConfig, DEFAULT_STORAGE_KEY};

const DEFAULT_DATA_DIR: &str = ".taskkit-data";
const DEFAULT_ADDR: &str = "127.0.0.1:8081";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub addr: SocketAddr,
    pub storage_key: String,
    pub reorder_mode: ReorderMode,
}

fn parse_flag(raw: Option<String>, default: bool) -> bool {
    match raw {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let data_dir = lookup("TASKKIT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let raw_addr = lookup("TASKKIT_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("TASKKIT_ADDR is not a socket address: {}", raw_addr))?;

        let storage_key = lookup("TASKKIT_STORAGE_KEY")
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        let reorder_mode = if parse_flag(lookup("TASKKIT_REORDER_CLAMP"), false) {
            ReorderMode::Clamp
        } else {
            ReorderMode::Reject
        };

        Ok(Self {
            data_dir,
            addr,
            storage_key,
            reorder_mode,
        })
    }

    pub fn task_store_config(&self) -> TaskStoreConfig {
        TaskStoreConfig {
            storage_key: self.storage_key.clone(),
            reorder_mode: self.reorder_mode,
        }
    }
}
