//! autoconfig-rs: serves mail client configuration documents

use anyhow::Context;
use autoconfig_rs::api::ApiServer;
use autoconfig_rs::config::{Config, LoggingConfig};
use autoconfig_rs::directory::LdapDirectoryClient;
use autoconfig_rs::generators::{AppleGenerator, ConfigGenerator};
use autoconfig_rs::model::{SeedFile, SqliteRepository};
use autoconfig_rs::utils::split_email;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "autoconfig-rs", version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create the database schema
    InitDb,
    /// Import domains from a TOML file into the database
    Seed {
        #[arg(long)]
        file: PathBuf,
    },
    /// Print the mobileconfig for an address
    Generate {
        #[arg(long)]
        email: String,
        /// Display name used when the directory provides none
        #[arg(long, default_value = "")]
        name: String,
        /// Read domains from this TOML file instead of the database
        #[arg(long)]
        domains: Option<PathBuf>,
    },
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("autoconfig_rs={},tower_http={}", logging.level, logging.level).into()
    });
    let json = logging.format == "json";

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::default(),
    };

    init_logging(&config.logging);

    info!("Starting autoconfig-rs v{}", env!("CARGO_PKG_VERSION"));
    match &cli.config {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("No config file specified, using defaults"),
    }

    let mut directory = LdapDirectoryClient::new();
    if let Some(timeout) = config.directory.connect_timeout() {
        directory = directory.with_connect_timeout(timeout);
    }
    let directory = Arc::new(directory);

    let command = cli.command.unwrap_or(Command::Serve);

    // Generating from a domains file needs no database
    if let Command::Generate {
        email,
        name,
        domains: Some(path),
    } = &command
    {
        let seed = SeedFile::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        let repository = Arc::new(seed.into_memory_repository());
        return generate(AppleGenerator::new(repository, directory), email, name).await;
    }

    let repository = Arc::new(SqliteRepository::connect(&config.database.url).await?);
    info!("Database ready: {}", config.database.url);

    match command {
        Command::Serve => {
            let apple = AppleGenerator::new(repository, directory);
            let server = ApiServer::new(apple, config.server.listen_addr.clone());
            server.run().await?;
        }
        Command::InitDb => {
            info!("Schema created");
        }
        Command::Seed { file } => {
            let seed = SeedFile::from_file(&file)
                .with_context(|| format!("Failed to load {}", file.display()))?;
            let count = seed.import(&repository).await?;
            info!("Imported {} domains from {}", count, file.display());
        }
        Command::Generate { email, name, .. } => {
            generate(AppleGenerator::new(repository, directory), &email, &name).await?;
        }
    }

    Ok(())
}

async fn generate(apple: AppleGenerator, email: &str, name: &str) -> anyhow::Result<()> {
    let (local_part, domain) = split_email(email)?;
    let document = apple.client_config(local_part, domain, name, "").await?;
    if document.is_empty() {
        info!("No directory entry for {}", email);
    } else {
        print!("{}", document);
    }
    Ok(())
}
