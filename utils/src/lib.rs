pub mod config;
pub mod datafeed;
pub mod disk_storage;
pub mod error;
pub mod log;
pub mod network;
pub mod pair;
pub mod reqwest;
pub mod serde;

pub use error::{Result, UtilsError as Error};

pub use datafeed::{DatafeedApi, DatafeedClient, Numeric, RawCandle};
pub use network::{Network, NetworkMode};
pub use pair::Pair;
pub use self::reqwest::Reqwest;
