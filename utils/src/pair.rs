use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// A DEX trading pair, identified by the asset being priced and the asset the
/// price is quoted in.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pair {
    pub amount_asset: String,
    pub price_asset: String,
}

impl Pair {
    pub fn new(amount_asset: impl Into<String>, price_asset: impl Into<String>) -> Self {
        Self {
            amount_asset: amount_asset.into(),
            price_asset: price_asset.into(),
        }
    }
}

impl Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.amount_asset, self.price_asset)
    }
}

impl FromStr for Pair {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let Some((amount, price)) = s.split_once('/') else {
            return Err(crate::Error::InvalidPair(s.to_string()));
        };
        let (amount, price) = (amount.trim(), price.trim());
        if amount.is_empty() || price.is_empty() || price.contains('/') {
            return Err(crate::Error::InvalidPair(s.to_string()));
        }
        Ok(Pair::new(amount, price))
    }
}
