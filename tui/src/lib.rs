mod error;
pub use error::{Error, FmtError, Result};

mod app;
pub mod chart;
mod events;

pub use app::App;
pub use chart::{ChartController, ChartSettings};
pub use events::AppEvent;
