//! Client configuration generators
//!
//! Every client format implements [`ConfigGenerator`]. Generators that honour
//! a domain's directory server share [`ldap_lookup`].

pub mod apple;
pub mod payload;
pub mod plist;

use tracing::debug;
use uuid::Uuid;

use crate::directory::{DirectoryClient, DirectoryConnection, DirectoryQuery, LookupResult, LookupStatus};
use crate::error::{AutoconfigError, Result};
use crate::model::LdapServer;

pub use apple::AppleGenerator;
pub use payload::{Payload, PayloadValue};

/// Prefix for identifiers minted by this service
pub const IDENTIFIER: &str = "autoconfig-rs";

pub fn branded_id(id: &str) -> String {
    format!("{}-{}", IDENTIFIER, id)
}

/// Fresh random identifier
pub fn unique() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait::async_trait]
pub trait ConfigGenerator: Send + Sync {
    /// Build the configuration document for `local_part@domain_name`
    ///
    /// An empty document is a valid answer: the user is not provisioned.
    async fn client_config(
        &self,
        local_part: &str,
        domain_name: &str,
        realname: &str,
        password: &str,
    ) -> Result<String>;
}

/// Look up `email_address` on a domain's directory server
///
/// A failed connection or bind is fatal; no match is not.
pub async fn ldap_lookup(
    client: &dyn DirectoryClient,
    email_address: &str,
    server: &LdapServer,
) -> Result<LookupResult> {
    let connection = DirectoryConnection::from_server(server);
    let query = DirectoryQuery::for_address(server, email_address);
    debug!("Directory lookup on {} with filter {}", connection.url(), query.filter);

    let result = client.lookup(&connection, &query).await;
    if result.status == LookupStatus::Error {
        return Err(AutoconfigError::DirectoryLookup(format!(
            "LDAP bind failed for {}",
            connection.url()
        )));
    }
    Ok(result)
}
