#![allow(clippy::uninlined_format_args)]

pub mod app;
pub mod browser;
pub mod collection;
pub mod config;
pub mod domain;
pub mod feed;
pub mod freshness;
pub mod logging;
pub mod nav;
pub mod pipeline;
pub mod prefs;
pub mod preview;
pub mod share;
pub mod toast;
pub mod ui;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
