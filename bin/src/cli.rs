use clap::Parser;
use dexchart_utils::{config::Config, Pair};

#[derive(Parser, Debug)]
#[command(name = "dexchart", bin_name = "dexchart", version)]
#[command(about = "Live candlestick chart for DEX trading pairs")]
pub struct Cli {
    /// Pairs to chart, as AMOUNT_ASSET/PRICE_ASSET. Falls back to `pairs`
    /// in the config file.
    pub pairs: Vec<String>,

    /// Substitute pairs for the test network
    #[arg(long)]
    pub testnet: bool,

    /// Base URL of the candles datafeed
    #[arg(long, env = "DEXCHART_DATAFEED_URL")]
    pub datafeed_url: Option<String>,

    /// Refresh interval in milliseconds
    #[arg(long)]
    pub refresh_ms: Option<u64>,

    /// Write the effective settings, pairs included, to the config file
    #[arg(long)]
    pub save_config: bool,
}

impl Cli {
    /// Command line flags win over the config file.
    pub fn apply(&self, config: &mut Config) {
        if self.testnet {
            config.testnet_mode = true;
        }
        if let Some(datafeed_url) = &self.datafeed_url {
            config.datafeed_url = datafeed_url.clone();
        }
        if let Some(refresh_ms) = self.refresh_ms {
            config.refresh_interval_ms = refresh_ms;
        }
        if !self.pairs.is_empty() {
            config.pairs = self.pairs.clone();
        }
    }

    pub fn resolve_pairs(config: &Config) -> dexchart_utils::Result<Vec<Pair>> {
        config.pairs.iter().map(|pair| pair.parse()).collect()
    }
}
