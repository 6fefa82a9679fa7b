//! Read-only access to the domain model

use std::collections::HashMap;

use crate::error::Result;
use crate::model::types::Domain;

/// Read access to configured domains
#[async_trait::async_trait]
pub trait DomainRepository: Send + Sync {
    /// Find a domain by its unique name, with provider, servers and
    /// directory server populated
    async fn find_domain(&self, name: &str) -> Result<Option<Domain>>;
}

/// In-memory repository, keyed by domain name
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    domains: HashMap<String, Domain>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a domain; servers are kept sorted by priority
    pub fn insert(&mut self, mut domain: Domain) {
        domain.servers.sort_by_key(|s| s.prio);
        self.domains.insert(domain.name.clone(), domain);
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.insert(domain);
        self
    }
}

#[async_trait::async_trait]
impl DomainRepository for MemoryRepository {
    async fn find_domain(&self, name: &str) -> Result<Option<Domain>> {
        Ok(self.domains.get(name).cloned())
    }
}
