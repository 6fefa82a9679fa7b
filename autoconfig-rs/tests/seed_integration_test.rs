//! Integration tests for importing domain files into SQLite

use autoconfig_rs::directory::{LookupResult, StaticDirectory};
use autoconfig_rs::generators::{AppleGenerator, ConfigGenerator};
use autoconfig_rs::model::{DomainRepository, SeedFile, SqliteRepository};
use std::sync::Arc;

const DOMAINS: &str = r#"
[[domains]]
name = "example.com"
provider = { name = "Example Provider", short_name = "Example" }

[domains.ldap_server]
name = "ldap.example.com"
port = 389
use_ssl = false
search_base = "ou=people,dc=example,dc=com"
search_filter = "(mail={0})"
attr_cn = "cn"

[[domains.servers]]
type = "smtp"
name = "smtp.example.com"
port = 587
socket_type = "STARTTLS"

[[domains.servers]]
type = "imap"
name = "mail.example.com"
port = 993
prio = 5

[[domains]]
name = "example.net"
provider = { name = "Other Provider", short_name = "Other" }

[[domains.servers]]
type = "imap"
name = "imap.example.net"
port = 143
socket_type = "plain"
authentication = "NTLM"
"#;

async fn setup_test_db() -> SqliteRepository {
    SqliteRepository::connect("sqlite::memory:").await.unwrap()
}

#[tokio::test]
async fn test_import_domains() {
    let repo = setup_test_db().await;
    let seed = SeedFile::from_toml(DOMAINS).unwrap();

    assert_eq!(seed.import(&repo).await.unwrap(), 2);

    let domain = repo.find_domain("example.com").await.unwrap().unwrap();
    assert_eq!(domain.provider.unwrap().name, "Example Provider");
    let names: Vec<&str> = domain.servers.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["mail.example.com", "smtp.example.com"]);
    assert_eq!(domain.servers[0].user_name, "%EMAILADDRESS%");

    let ldap = domain.ldap_server.unwrap();
    assert_eq!(ldap.port, 389);
    assert_eq!(ldap.attr_uid, "uid");
    assert!(ldap.bind_user.is_none());

    let other = repo.find_domain("example.net").await.unwrap().unwrap();
    assert_eq!(other.servers.len(), 1);
    assert_eq!(other.servers[0].authentication, "NTLM");
    assert!(other.ldap_server.is_none());
}

#[tokio::test]
async fn test_generate_from_imported_domain() {
    let repo = setup_test_db().await;
    SeedFile::from_toml(DOMAINS).unwrap().import(&repo).await.unwrap();

    let generator = AppleGenerator::new(
        Arc::new(repo),
        Arc::new(StaticDirectory::new(LookupResult::found(
            Some("Alice Example".to_string()),
            Some("alice".to_string()),
        ))),
    );
    let xml = generator
        .client_config("alice", "example.com", "", "")
        .await
        .unwrap();

    assert!(xml.contains("<key>IncomingMailServerHostName</key><string>mail.example.com</string>"));
    assert!(xml.contains("<key>OutgoingMailServerPortNumber</key><integer>587</integer>"));
    assert!(xml.contains("<key>EmailAccountName</key><string>Alice Example</string>"));
}

#[tokio::test]
async fn test_import_duplicate_domain_fails() {
    let repo = setup_test_db().await;
    let seed = SeedFile::from_toml(DOMAINS).unwrap();
    seed.import(&repo).await.unwrap();

    assert!(seed.import(&repo).await.is_err());
}
