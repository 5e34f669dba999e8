pub mod config;
pub mod controller;
pub mod feed;
pub mod logging;
pub mod model;
pub mod storage;

#[cfg(feature = "tui")]
pub mod tui;
