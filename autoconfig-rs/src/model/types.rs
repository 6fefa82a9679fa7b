//! Model types and the enum mappings for their string-valued columns

use serde::{Deserialize, Serialize};

use crate::error::{AutoconfigError, Result};

/// A mail domain and everything needed to configure clients for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    /// Unique domain name
    pub name: String,
    /// Provider serving this domain; required for autoconfiguration
    pub provider: Option<Provider>,
    /// Servers ordered by priority
    #[serde(default)]
    pub servers: Vec<Server>,
    /// Directory used to resolve display names
    pub ldap_server: Option<LdapServer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    pub short_name: String,
}

/// Incoming or outgoing mail server
///
/// String fields are kept as stored; see [`Server::direction`],
/// [`Server::authentication_kind`] and [`Server::socket_kind`] for the typed
/// views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    /// Protocol, e.g. `imap` or `smtp`
    #[serde(rename = "type")]
    pub server_type: String,
    /// Host name
    pub name: String,
    pub port: u16,
    /// User name template, may contain placeholders
    #[serde(default = "default_user_name")]
    pub user_name: String,
    /// `none`, `NTLM` or `plain`
    #[serde(default = "default_authentication")]
    pub authentication: String,
    /// `SSL`, `STARTTLS` or `plain`
    #[serde(default = "default_socket_type")]
    pub socket_type: String,
    /// Lower values sort first
    #[serde(default = "default_prio")]
    pub prio: i64,
}

/// Directory server used for display name lookups
#[derive(Clone, Serialize, Deserialize)]
pub struct LdapServer {
    /// Host name
    pub name: String,
    pub port: u16,
    pub use_ssl: bool,
    pub bind_user: Option<String>,
    pub bind_password: Option<String>,
    pub search_base: String,
    /// Filter template; `{0}` or `{}` is replaced with the email address
    pub search_filter: String,
    pub attr_cn: Option<String>,
    #[serde(default = "default_attr_uid")]
    pub attr_uid: String,
}

impl std::fmt::Debug for LdapServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapServer")
            .field("name", &self.name)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .field("bind_user", &self.bind_user)
            .field("bind_password", &self.bind_password.as_ref().map(|_| "***"))
            .field("search_base", &self.search_base)
            .field("search_filter", &self.search_filter)
            .field("attr_cn", &self.attr_cn)
            .field("attr_uid", &self.attr_uid)
            .finish()
    }
}

pub(crate) fn default_user_name() -> String {
    crate::utils::placeholders::EMAIL_ADDRESS.to_string()
}

pub(crate) fn default_authentication() -> String {
    "plain".to_string()
}

pub(crate) fn default_socket_type() -> String {
    "SSL".to_string()
}

fn default_prio() -> i64 {
    10
}

pub(crate) fn default_attr_uid() -> String {
    "uid".to_string()
}

/// Mail transfer direction of a server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    /// Mail retrieval (IMAP)
    Incoming,
    /// Mail submission (SMTP)
    Outgoing,
}

impl TransferDirection {
    /// Map a server type to its direction
    pub fn from_server_type(server_type: &str) -> Option<Self> {
        match server_type {
            "imap" => Some(TransferDirection::Incoming),
            "smtp" => Some(TransferDirection::Outgoing),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationKind {
    None,
    Ntlm,
    Plain,
}

impl AuthenticationKind {
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "none" => Some(AuthenticationKind::None),
            "NTLM" => Some(AuthenticationKind::Ntlm),
            "plain" => Some(AuthenticationKind::Plain),
            _ => None,
        }
    }
}

/// Transport security of a server connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketKind {
    Ssl,
    StartTls,
    /// Anything that is neither `SSL` nor `STARTTLS`
    Plain,
}

impl SocketKind {
    /// Total mapping: unknown values are plain sockets
    pub fn from_db_string(s: &str) -> Self {
        match s {
            "SSL" => SocketKind::Ssl,
            "STARTTLS" => SocketKind::StartTls,
            _ => SocketKind::Plain,
        }
    }

    pub fn uses_ssl(&self) -> bool {
        matches!(self, SocketKind::Ssl | SocketKind::StartTls)
    }
}

impl Server {
    pub fn direction(&self) -> Result<TransferDirection> {
        TransferDirection::from_server_type(&self.server_type)
            .ok_or_else(|| AutoconfigError::InvalidServerType(self.server_type.clone()))
    }

    pub fn authentication_kind(&self) -> Result<AuthenticationKind> {
        AuthenticationKind::from_db_string(&self.authentication)
            .ok_or_else(|| AutoconfigError::InvalidAuthenticationType(self.authentication.clone()))
    }

    pub fn socket_kind(&self) -> SocketKind {
        SocketKind::from_db_string(&self.socket_type)
    }
}
