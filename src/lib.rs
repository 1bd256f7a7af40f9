// ABOUTME: Library root for deploylog - per-channel deploy tracking.
// ABOUTME: The CLI binary is in main.rs.

pub mod config;
pub mod dashboard;
pub mod deploy;
pub mod error;
pub mod output;
pub mod store;
pub mod types;
