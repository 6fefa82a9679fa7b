//! Apple `.mobileconfig` generator
//!
//! Builds one `com.apple.mail.managed` account payload wrapped in a
//! `Configuration` envelope and serializes it as a plist.

use std::sync::Arc;

use tracing::{debug, info};

use crate::directory::{DirectoryClient, LookupStatus};
use crate::error::{AutoconfigError, Result};
use crate::generators::payload::Payload;
use crate::generators::{branded_id, ldap_lookup, plist, unique, ConfigGenerator};
use crate::model::{AuthenticationKind, DomainRepository, Server, TransferDirection};

pub const CONTENT_TYPE: &str = "application/x-apple-aspen-config; charset=utf-8";

/// Authentication scheme names understood by Apple Mail
pub fn apple_authentication(kind: AuthenticationKind) -> &'static str {
    match kind {
        AuthenticationKind::None => "EmailAuthNone",
        AuthenticationKind::Ntlm => "EmailAuthNTLM",
        AuthenticationKind::Plain => "EmailAuthPassword",
    }
}

fn key_prefix(direction: TransferDirection) -> &'static str {
    match direction {
        TransferDirection::Incoming => "Incoming",
        TransferDirection::Outgoing => "Outgoing",
    }
}

/// The per-account dictionary and the envelope that carries it
#[derive(Debug, Clone)]
pub struct AccountPayload {
    inner: Payload,
    outer: Payload,
}

impl AccountPayload {
    /// Base payload with fixed values set and data-dependent keys unset
    pub fn new(local_part: &str, domain: &str) -> Self {
        let address = format!("{}@{}", local_part, domain);

        let uuid = unique();
        let inner = Payload::new()
            .with("EmailAccountDescription", address.as_str())
            .with_unset("EmailAccountName")
            .with("EmailAccountType", "EmailTypeIMAP")
            .with("EmailAddress", address.as_str())
            .with("IncomingMailServerAuthentication", "EmailAuthPassword")
            .with_unset("IncomingMailServerHostName")
            .with_unset("IncomingMailServerPortNumber")
            .with_unset("IncomingMailServerUseSSL")
            .with_unset("IncomingMailServerUsername")
            .with("OutgoingMailServerAuthentication", "EmailAuthPassword")
            .with_unset("OutgoingMailServerHostName")
            .with_unset("OutgoingMailServerPortNumber")
            .with_unset("OutgoingMailServerUseSSL")
            .with_unset("OutgoingMailServerUsername")
            .with("OutgoingPasswordSameAsIncomingPassword", true)
            .with(
                "PayloadDescription",
                format!("Email account configuration for {}", address),
            )
            .with("PayloadDisplayName", domain)
            .with("PayloadIdentifier", format!("com.apple.mail.managed.{}", uuid))
            .with("PayloadType", "com.apple.mail.managed")
            .with("PayloadUUID", uuid)
            .with("PayloadVersion", 1i64)
            .with("SMIMEEnablePerMessageSwitch", false)
            .with("SMIMEEnabled", false)
            .with("SMIMEEncryptionEnabled", false)
            .with("SMIMESigningEnabled", false)
            .with("allowMailDrop", false)
            .with("disableMailRecentsSyncing", false);

        let uuid = unique();
        let outer = Payload::new()
            .with_unset("PayloadContent")
            .with("PayloadDisplayName", format!("Mail account {}", domain))
            .with("PayloadIdentifier", branded_id(&uuid))
            .with("PayloadRemovalDisallowed", false)
            .with("PayloadType", "Configuration")
            .with("PayloadUUID", uuid)
            .with("PayloadVersion", 1i64);

        Self { inner, outer }
    }

    /// Fill the host, port, user name, authentication and SSL keys of
    /// `direction` from `server`
    pub fn apply_server(&mut self, direction: TransferDirection, server: &Server) -> Result<()> {
        let authentication = apple_authentication(server.authentication_kind()?);
        let prefix = key_prefix(direction);

        self.inner
            .set(format!("{}MailServerHostName", prefix), server.name.as_str());
        self.inner
            .set(format!("{}MailServerPortNumber", prefix), server.port);
        self.inner
            .set(format!("{}MailServerUsername", prefix), server.user_name.as_str());
        self.inner
            .set(format!("{}MailServerAuthentication", prefix), authentication);
        self.inner.set(
            format!("{}MailServerUseSSL", prefix),
            server.socket_kind().uses_ssl(),
        );
        Ok(())
    }

    pub fn set_account_name(&mut self, name: &str) {
        self.inner.set("EmailAccountName", name);
    }

    pub fn inner(&self) -> &Payload {
        &self.inner
    }

    /// The envelope with the account dictionary as its only content
    pub fn into_tree(self) -> Payload {
        let mut outer = self.outer;
        outer.set("PayloadContent", vec![self.inner]);
        outer
    }
}

pub struct AppleGenerator {
    repository: Arc<dyn DomainRepository>,
    directory: Arc<dyn DirectoryClient>,
}

impl AppleGenerator {
    pub fn new(repository: Arc<dyn DomainRepository>, directory: Arc<dyn DirectoryClient>) -> Self {
        Self {
            repository,
            directory,
        }
    }
}

#[async_trait::async_trait]
impl ConfigGenerator for AppleGenerator {
    async fn client_config(
        &self,
        local_part: &str,
        domain_name: &str,
        realname: &str,
        _password: &str,
    ) -> Result<String> {
        let domain = self
            .repository
            .find_domain(domain_name)
            .await?
            .ok_or_else(|| AutoconfigError::DomainNotFound(domain_name.to_string()))?;
        if domain.provider.is_none() {
            return Err(AutoconfigError::NoProviderForDomain(domain_name.to_string()));
        }
        if domain.servers.is_empty() {
            return Err(AutoconfigError::NoServersForDomain(domain_name.to_string()));
        }

        let lookup = match &domain.ldap_server {
            Some(ldap_server) => {
                let email_address = format!("{}@{}", local_part, domain_name);
                let result =
                    ldap_lookup(self.directory.as_ref(), &email_address, ldap_server).await?;
                if result.status == LookupStatus::NoMatch {
                    info!("No directory entry for {}, returning empty document", email_address);
                    return Ok(String::new());
                }
                Some(result)
            }
            None => None,
        };

        let mut payload = AccountPayload::new(local_part, domain_name);

        // Servers arrive by priority; a later server of the same direction
        // overwrites an earlier one
        for server in &domain.servers {
            let direction = server.direction()?;
            debug!("Applying {} server {}", server.server_type, server.name);
            payload.apply_server(direction, server)?;
        }

        let realname = lookup
            .and_then(|result| result.cn)
            .filter(|cn| !cn.is_empty())
            .unwrap_or_else(|| realname.to_string());
        payload.set_account_name(&realname);

        let mut tree = payload.into_tree();
        tree.sanitise(local_part, domain_name)?;

        debug!("Built mobileconfig for {}@{}", local_part, domain_name);
        plist::to_plist(&tree)
    }
}
