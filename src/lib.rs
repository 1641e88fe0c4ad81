//! QueryWeaver demo widget
//!
//! The interactive demo on the QueryWeaver landing page: it cycles through
//! canned natural-language questions, types out the SQL each one becomes
//! with syntax highlighting, and drives the page's tabs and scroll-in card
//! animations.
//!
//! The crate builds to WebAssembly for the page and natively, where the
//! same controller plays the demo in a terminal.

pub mod analytics;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod highlight;
pub mod landing;
pub mod page;
pub mod reveal;
pub mod state;
pub mod viewport;

#[cfg(not(target_arch = "wasm32"))]
pub mod terminal;

pub use analytics::{AnalyticsEvent, AnalyticsSink, LogSink};
pub use config::{ConfigError, DemoConfig, LogLevel};
pub use controller::DemoController;
pub use error::DemoError;
pub use highlight::{Highlighted, highlight, highlight_markup};
pub use page::boot;

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
