//! LDAP implementation of [`DirectoryClient`] on top of `ldap3`

use std::time::Duration;

use ldap3::{LdapConnAsync, LdapConnSettings, LdapError, Scope, SearchEntry};
use tracing::{debug, warn};

use super::{DirectoryClient, DirectoryConnection, DirectoryQuery, LookupResult};

/// Opens one connection per lookup: connect, bind, search, unbind
#[derive(Debug, Clone, Default)]
pub struct LdapDirectoryClient {
    connect_timeout: Option<Duration>,
}

impl LdapDirectoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    fn settings(&self) -> LdapConnSettings {
        let settings = LdapConnSettings::new();
        match self.connect_timeout {
            Some(timeout) => settings.set_conn_timeout(timeout),
            None => settings,
        }
    }
}

/// First value of `attr`, matching the attribute name case-insensitively
fn first_value(entry: &SearchEntry, attr: &str) -> Option<String> {
    entry
        .attrs
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(attr))
        .and_then(|(_, values)| values.first().cloned())
}

#[async_trait::async_trait]
impl DirectoryClient for LdapDirectoryClient {
    async fn lookup(&self, connection: &DirectoryConnection, query: &DirectoryQuery) -> LookupResult {
        let url = connection.url();

        let (conn, mut ldap) = match LdapConnAsync::with_settings(self.settings(), &url).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!("LDAP connection to {} failed: {}", url, e);
                return LookupResult::error();
            }
        };
        ldap3::drive!(conn);

        if let Some(bind_user) = &connection.bind_user {
            let password = connection.bind_password.as_deref().unwrap_or_default();
            if let Err(e) = ldap
                .simple_bind(bind_user, password)
                .await
                .and_then(|r| r.success())
            {
                warn!("LDAP bind to {} as {} failed: {}", url, bind_user, e);
                let _ = ldap.unbind().await;
                return LookupResult::error();
            }
        }

        let search: Result<_, LdapError> = ldap
            .search(
                &query.search_base,
                Scope::Subtree,
                &query.filter,
                query.attributes(),
            )
            .await
            .and_then(|r| r.success());
        let _ = ldap.unbind().await;

        match search {
            Ok((entries, _)) => match entries.into_iter().next() {
                Some(entry) => {
                    let entry = SearchEntry::construct(entry);
                    debug!("LDAP match for {}: {}", query.filter, entry.dn);
                    let cn = query
                        .attr_cn
                        .as_deref()
                        .and_then(|attr| first_value(&entry, attr));
                    let uid = first_value(&entry, &query.attr_uid);
                    LookupResult::found(cn, uid)
                }
                None => {
                    debug!("No LDAP match for {}", query.filter);
                    LookupResult::no_match()
                }
            },
            Err(e) => {
                warn!("LDAP search on {} failed: {}", url, e);
                LookupResult::error()
            }
        }
    }
}
