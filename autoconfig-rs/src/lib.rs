//! autoconfig-rs: mail client autoconfiguration
//!
//! Generates Apple `.mobileconfig` documents from a stored
//! domain/provider/server model, optionally resolving the user's display name
//! through the domain's LDAP directory.
//!
//! # Example
//!
//! ```no_run
//! use autoconfig_rs::directory::LdapDirectoryClient;
//! use autoconfig_rs::generators::{AppleGenerator, ConfigGenerator};
//! use autoconfig_rs::model::SqliteRepository;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repository = Arc::new(SqliteRepository::connect("sqlite://autoconfig.db").await?);
//!     let generator = AppleGenerator::new(repository, Arc::new(LdapDirectoryClient::new()));
//!
//!     let document = generator
//!         .client_config("alice", "example.com", "Alice", "")
//!         .await?;
//!     println!("{}", document);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`api`]: HTTP endpoints
//! - [`config`]: Configuration management
//! - [`directory`]: Directory (LDAP) lookups
//! - [`error`]: Error types
//! - [`generators`]: Client configuration generators
//! - [`model`]: Domain model and repositories
//! - [`utils`]: Placeholder expansion and address helpers

pub mod api;
pub mod config;
pub mod directory;
pub mod error;
pub mod generators;
pub mod model;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AutoconfigError, Result};
