//! Directory (LDAP) lookups of display names
//!
//! The generators only see [`DirectoryClient`]: given connection parameters
//! and a query it answers with a [`LookupResult`]. A failed connection or bind
//! is reported as [`LookupStatus::Error`], an empty search as
//! [`LookupStatus::NoMatch`].

pub mod ldap;

use std::sync::Mutex;

use crate::model::LdapServer;

pub use ldap::LdapDirectoryClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStatus {
    Ok,
    NoMatch,
    Error,
}

/// Outcome of a directory lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub status: LookupStatus,
    /// Resolved common name (display name)
    pub cn: Option<String>,
    pub uid: Option<String>,
}

impl LookupResult {
    pub fn found(cn: Option<String>, uid: Option<String>) -> Self {
        Self {
            status: LookupStatus::Ok,
            cn,
            uid,
        }
    }

    pub fn no_match() -> Self {
        Self {
            status: LookupStatus::NoMatch,
            cn: None,
            uid: None,
        }
    }

    pub fn error() -> Self {
        Self {
            status: LookupStatus::Error,
            cn: None,
            uid: None,
        }
    }
}

/// Where and as whom to connect
#[derive(Clone, PartialEq, Eq)]
pub struct DirectoryConnection {
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
    pub bind_user: Option<String>,
    pub bind_password: Option<String>,
}

impl DirectoryConnection {
    pub fn from_server(server: &LdapServer) -> Self {
        Self {
            host: server.name.clone(),
            port: server.port,
            use_tls: server.use_ssl,
            bind_user: server.bind_user.clone(),
            bind_password: server.bind_password.clone(),
        }
    }

    /// `ldaps://host:port` or `ldap://host:port`
    pub fn url(&self) -> String {
        let scheme = if self.use_tls { "ldaps" } else { "ldap" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

impl std::fmt::Debug for DirectoryConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConnection")
            .field("url", &self.url())
            .field("bind_user", &self.bind_user)
            .finish_non_exhaustive()
    }
}

/// A single-entry search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryQuery {
    pub search_base: String,
    pub filter: String,
    pub attr_cn: Option<String>,
    pub attr_uid: String,
}

impl DirectoryQuery {
    /// Build the query for an email address from a directory server record
    ///
    /// `{0}` and `{}` in the filter template are replaced with the escaped
    /// address; `{{` and `}}` stand for literal braces.
    pub fn for_address(server: &LdapServer, email_address: &str) -> Self {
        let escaped = ::ldap3::ldap_escape(email_address);
        Self {
            search_base: server.search_base.clone(),
            filter: fill_filter(&server.search_filter, &escaped),
            attr_cn: server.attr_cn.clone(),
            attr_uid: server.attr_uid.clone(),
        }
    }

    /// Attributes to request from the directory
    pub fn attributes(&self) -> Vec<&str> {
        let mut attrs = vec![self.attr_uid.as_str()];
        if let Some(cn) = &self.attr_cn {
            attrs.push(cn.as_str());
        }
        attrs
    }
}

fn fill_filter(template: &str, value: &str) -> String {
    let mut filter = String::with_capacity(template.len() + value.len());
    let mut rest = template;
    while let Some(pos) = rest.find(['{', '}']) {
        filter.push_str(&rest[..pos]);
        rest = &rest[pos..];
        if let Some(tail) = rest.strip_prefix("{{") {
            filter.push('{');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("}}") {
            filter.push('}');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("{0}").or_else(|| rest.strip_prefix("{}")) {
            filter.push_str(value);
            rest = tail;
        } else {
            // Unpaired brace, kept as is
            filter.push_str(&rest[..1]);
            rest = &rest[1..];
        }
    }
    filter.push_str(rest);
    filter
}

/// Directory lookup service
#[async_trait::async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn lookup(&self, connection: &DirectoryConnection, query: &DirectoryQuery) -> LookupResult;
}

/// Directory that answers every lookup with the same result
///
/// Records each query so callers can inspect what was asked.
pub struct StaticDirectory {
    result: LookupResult,
    queries: Mutex<Vec<(DirectoryConnection, DirectoryQuery)>>,
}

impl StaticDirectory {
    pub fn new(result: LookupResult) -> Self {
        Self {
            result,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<(DirectoryConnection, DirectoryQuery)> {
        self.queries
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl DirectoryClient for StaticDirectory {
    async fn lookup(&self, connection: &DirectoryConnection, query: &DirectoryQuery) -> LookupResult {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((connection.clone(), query.clone()));
        }
        self.result.clone()
    }
}
