use std::collections::BTreeMap;

use crate::{config::Config, pair::Pair};

/// Tells the chart which network the app is running against, and how to map
/// a pair onto the assets the datafeed has market data for.
pub trait NetworkMode: Send + Sync + 'static {
    fn is_testnet(&self) -> bool;

    fn testnet_substitute_pair(&self, pair: &Pair) -> Pair;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Network {
    pub testnet: bool,
    /// Asset id on the test network -> asset id known to the datafeed.
    pub substitutions: BTreeMap<String, String>,
}

impl Network {
    pub fn new(testnet: bool, substitutions: BTreeMap<String, String>) -> Self {
        Self {
            testnet,
            substitutions,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.testnet_mode, config.testnet_substitutions.clone())
    }

    fn substitute_asset(&self, asset: &str) -> String {
        self.substitutions
            .get(asset)
            .cloned()
            .unwrap_or_else(|| asset.to_string())
    }
}

impl NetworkMode for Network {
    fn is_testnet(&self) -> bool {
        self.testnet
    }

    fn testnet_substitute_pair(&self, pair: &Pair) -> Pair {
        Pair::new(
            self.substitute_asset(&pair.amount_asset),
            self.substitute_asset(&pair.price_asset),
        )
    }
}
