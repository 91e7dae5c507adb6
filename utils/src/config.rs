use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{datafeed::DEFAULT_DATAFEED_URL, disk_storage::DiskStorageInterface};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub testnet_mode: bool,
    #[serde(default = "default_datafeed_url")]
    pub datafeed_url: String,
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    #[serde(default)]
    pub testnet_substitutions: BTreeMap<String, String>,
    #[serde(default)]
    pub pairs: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            testnet_mode: false,
            datafeed_url: default_datafeed_url(),
            refresh_interval_ms: default_refresh_interval_ms(),
            testnet_substitutions: BTreeMap::new(),
            pairs: Vec::new(),
        }
    }
}

fn default_datafeed_url() -> String {
    DEFAULT_DATAFEED_URL.to_string()
}

fn default_refresh_interval_ms() -> u64 {
    5000
}

impl DiskStorageInterface for Config {
    const FILE_NAME: &'static str = "config";
}
