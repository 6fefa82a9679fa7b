use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutoconfigError {
    #[error("Domain \"{0}\" not found")]
    DomainNotFound(String),

    #[error("No provider for domain \"{0}\"")]
    NoProviderForDomain(String),

    #[error("No servers for domain \"{0}\"")]
    NoServersForDomain(String),

    #[error("Invalid server type \"{0}\"")]
    InvalidServerType(String),

    #[error("Invalid authentication type \"{0}\"")]
    InvalidAuthenticationType(String),

    #[error("Directory lookup failed: {0}")]
    DirectoryLookup(String),

    #[error("Missing value for payload keys: {}", .0.join(", "))]
    PayloadIntegrity(Vec<String>),

    #[error("Serialization error: {0}")]
    Serialization(#[from] std::fmt::Error),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid seed data: {0}")]
    InvalidSeed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AutoconfigError>;
