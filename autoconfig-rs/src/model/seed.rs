//! Domain data files
//!
//! A seed file lists domains as `[[domains]]` tables:
//!
//! ```toml
//! [[domains]]
//! name = "example.com"
//! provider = { name = "Example Provider", short_name = "Example" }
//!
//! [[domains.servers]]
//! type = "imap"
//! name = "mail.example.com"
//! port = 993
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AutoconfigError, Result};
use crate::model::repository::MemoryRepository;
use crate::model::sqlite::SqliteRepository;
use crate::model::types::Domain;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub domains: Vec<Domain>,
}

impl SeedFile {
    pub fn from_toml(content: &str) -> Result<Self> {
        let seed: Self =
            toml::from_str(content).map_err(|e| AutoconfigError::InvalidSeed(e.to_string()))?;
        seed.validate()?;
        Ok(seed)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Domain names must be unique within a file
    fn validate(&self) -> Result<()> {
        let mut names: Vec<&str> = self.domains.iter().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(AutoconfigError::InvalidSeed(format!(
                "duplicate domain \"{}\"",
                pair[0]
            )));
        }
        Ok(())
    }

    /// Insert every domain into the database, returning the number imported
    pub async fn import(&self, repository: &SqliteRepository) -> Result<usize> {
        for domain in &self.domains {
            repository.import_domain(domain).await?;
        }
        Ok(self.domains.len())
    }

    pub fn into_memory_repository(self) -> MemoryRepository {
        self.domains
            .into_iter()
            .fold(MemoryRepository::new(), MemoryRepository::with_domain)
    }
}
