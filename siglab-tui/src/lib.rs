//! Siglab TUI — single-screen dashboard for the MA/RSI signal pipeline.
//!
//! Shows the price with both moving averages and BUY/SELL markers, the RSI
//! with its bands, backtest metrics and the latest rows. Loading runs on a
//! worker thread; the main thread only renders and handles keys.

pub mod app;
pub mod input;
pub mod theme;
pub mod ui;
pub mod worker;

pub use app::{AppState, StatusLevel};
pub use theme::Theme;

#[cfg(test)]
mod test_helpers;
