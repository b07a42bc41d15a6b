//! Daily digest of night-run stress-test issues pulled from the tracker's
//! XML search feed.

pub mod app;
pub mod config;
pub mod db;
pub mod debounce;
pub mod error;
pub mod feed;
pub mod models;
pub mod report;
pub mod scheduler;
pub mod tui;
