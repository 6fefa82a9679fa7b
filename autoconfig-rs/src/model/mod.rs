//! Domain/provider/server model
//!
//! The generators only read this model. [`DomainRepository`] hands out fully
//! populated [`Domain`] values; [`MemoryRepository`] and [`SqliteRepository`]
//! are the two backends. [`SeedFile`] loads domain data from TOML.

pub mod repository;
pub mod seed;
pub mod sqlite;
pub mod types;

pub use repository::{DomainRepository, MemoryRepository};
pub use seed::SeedFile;
pub use sqlite::SqliteRepository;
pub use types::{
    AuthenticationKind, Domain, LdapServer, Provider, Server, SocketKind, TransferDirection,
};
