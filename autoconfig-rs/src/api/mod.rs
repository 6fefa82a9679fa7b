//! HTTP API for autoconfig-rs
//!
//! Serves generated client configuration documents

pub mod handlers;
pub mod server;

pub use handlers::AppState;
pub use server::ApiServer;
