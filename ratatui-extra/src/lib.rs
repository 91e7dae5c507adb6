pub mod widgets;

#[cfg(test)]
pub mod testutils;

pub use widgets::*;
