//! SQLite-backed domain repository

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::Result;
use crate::model::repository::DomainRepository;
use crate::model::types::{Domain, LdapServer, Provider, Server};

pub struct SqliteRepository {
    db: SqlitePool,
}

impl SqliteRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Connect to `database_url` and make sure the schema exists
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to an in-memory database sees its own database
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let db = pool.connect_with(options).await?;
        let repo = Self::new(db);
        repo.init_db().await?;
        Ok(repo)
    }

    /// Create the model tables
    pub async fn init_db(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS provider (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                short_name TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ldapserver (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                port INTEGER NOT NULL,
                use_ssl BOOLEAN NOT NULL DEFAULT 1,
                search_base TEXT NOT NULL,
                search_filter TEXT NOT NULL,
                attr_uid TEXT NOT NULL DEFAULT 'uid',
                attr_cn TEXT,
                bind_user TEXT,
                bind_password TEXT
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS domain (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                provider_id INTEGER REFERENCES provider(id),
                ldapserver_id INTEGER REFERENCES ldapserver(id)
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS server (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                prio INTEGER NOT NULL DEFAULT 10,
                port INTEGER NOT NULL,
                type TEXT NOT NULL DEFAULT 'imap',
                name TEXT NOT NULL,
                socket_type TEXT NOT NULL DEFAULT 'SSL',
                user_name TEXT NOT NULL DEFAULT '%EMAILADDRESS%',
                authentication TEXT NOT NULL DEFAULT 'plain'
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS server_domain (
                server_id INTEGER NOT NULL REFERENCES server(id),
                domain_id INTEGER NOT NULL REFERENCES domain(id),
                PRIMARY KEY (server_id, domain_id)
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        Ok(())
    }

    pub async fn add_provider(&self, provider: &Provider) -> Result<i64> {
        let result = sqlx::query("INSERT INTO provider (name, short_name) VALUES (?, ?)")
            .bind(&provider.name)
            .bind(&provider.short_name)
            .execute(&self.db)
            .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn add_ldap_server(&self, ldap: &LdapServer) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO ldapserver (
                name, port, use_ssl, search_base, search_filter,
                attr_uid, attr_cn, bind_user, bind_password
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&ldap.name)
        .bind(ldap.port as i64)
        .bind(ldap.use_ssl)
        .bind(&ldap.search_base)
        .bind(&ldap.search_filter)
        .bind(&ldap.attr_uid)
        .bind(&ldap.attr_cn)
        .bind(&ldap.bind_user)
        .bind(&ldap.bind_password)
        .execute(&self.db)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn add_domain(
        &self,
        name: &str,
        provider_id: Option<i64>,
        ldapserver_id: Option<i64>,
    ) -> Result<i64> {
        let result =
            sqlx::query("INSERT INTO domain (name, provider_id, ldapserver_id) VALUES (?, ?, ?)")
                .bind(name)
                .bind(provider_id)
                .bind(ldapserver_id)
                .execute(&self.db)
                .await?;

        Ok(result.last_insert_rowid())
    }

    /// Insert a server and attach it to the given domains
    pub async fn add_server(&self, server: &Server, domain_ids: &[i64]) -> Result<i64> {
        let mut tx = self.db.begin().await?;

        let server_id = sqlx::query(
            r#"
            INSERT INTO server (prio, port, type, name, socket_type, user_name, authentication)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(server.prio)
        .bind(server.port as i64)
        .bind(&server.server_type)
        .bind(&server.name)
        .bind(&server.socket_type)
        .bind(&server.user_name)
        .bind(&server.authentication)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for domain_id in domain_ids {
            sqlx::query("INSERT INTO server_domain (server_id, domain_id) VALUES (?, ?)")
                .bind(server_id)
                .bind(*domain_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(server_id)
    }

    /// Insert a domain with its provider, directory and servers
    ///
    /// Provider and directory rows are created per domain.
    pub async fn import_domain(&self, domain: &Domain) -> Result<i64> {
        let provider_id = match &domain.provider {
            Some(provider) => Some(self.add_provider(provider).await?),
            None => None,
        };
        let ldapserver_id = match &domain.ldap_server {
            Some(ldap) => Some(self.add_ldap_server(ldap).await?),
            None => None,
        };
        let domain_id = self
            .add_domain(&domain.name, provider_id, ldapserver_id)
            .await?;

        for server in &domain.servers {
            self.add_server(server, &[domain_id]).await?;
        }

        debug!(
            "Imported domain {} with {} servers",
            domain.name,
            domain.servers.len()
        );
        Ok(domain_id)
    }

    async fn load_provider(&self, id: i64) -> Result<Option<Provider>> {
        let row = sqlx::query("SELECT name, short_name FROM provider WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        row.map(|row| -> Result<Provider> {
            Ok(Provider {
                name: row.try_get("name")?,
                short_name: row.try_get("short_name")?,
            })
        })
        .transpose()
    }

    async fn load_ldap_server(&self, id: i64) -> Result<Option<LdapServer>> {
        let row = sqlx::query(
            r#"
            SELECT name, port, use_ssl, search_base, search_filter,
                   attr_uid, attr_cn, bind_user, bind_password
            FROM ldapserver
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(|row| -> Result<LdapServer> {
            Ok(LdapServer {
                name: row.try_get("name")?,
                port: port_column(&row)?,
                use_ssl: row.try_get("use_ssl")?,
                bind_user: row.try_get("bind_user")?,
                bind_password: row.try_get("bind_password")?,
                search_base: row.try_get("search_base")?,
                search_filter: row.try_get("search_filter")?,
                attr_cn: row.try_get("attr_cn")?,
                attr_uid: row.try_get("attr_uid")?,
            })
        })
        .transpose()
    }

    async fn load_servers(&self, domain_id: i64) -> Result<Vec<Server>> {
        let rows = sqlx::query(
            r#"
            SELECT s.prio, s.port, s.type, s.name, s.socket_type, s.user_name, s.authentication
            FROM server s
            JOIN server_domain sd ON sd.server_id = s.id
            WHERE sd.domain_id = ?
            ORDER BY s.prio, s.id
            "#,
        )
        .bind(domain_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<Server> {
                Ok(Server {
                    server_type: row.try_get("type")?,
                    name: row.try_get("name")?,
                    port: port_column(&row)?,
                    user_name: row.try_get("user_name")?,
                    authentication: row.try_get("authentication")?,
                    socket_type: row.try_get("socket_type")?,
                    prio: row.try_get("prio")?,
                })
            })
            .collect()
    }
}

fn port_column(row: &SqliteRow) -> std::result::Result<u16, sqlx::Error> {
    let port: i64 = row.try_get("port")?;
    u16::try_from(port).map_err(|_| sqlx::Error::Decode(format!("Invalid port {}", port).into()))
}

#[async_trait::async_trait]
impl DomainRepository for SqliteRepository {
    async fn find_domain(&self, name: &str) -> Result<Option<Domain>> {
        let row = sqlx::query("SELECT id, provider_id, ldapserver_id FROM domain WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.db)
            .await?;

        let Some(row) = row else {
            debug!("Domain {} not in database", name);
            return Ok(None);
        };

        let id: i64 = row.try_get("id")?;
        let provider_id: Option<i64> = row.try_get("provider_id")?;
        let ldapserver_id: Option<i64> = row.try_get("ldapserver_id")?;

        let provider = match provider_id {
            Some(id) => self.load_provider(id).await?,
            None => None,
        };
        let ldap_server = match ldapserver_id {
            Some(id) => self.load_ldap_server(id).await?,
            None => None,
        };
        let servers = self.load_servers(id).await?;

        Ok(Some(Domain {
            name: name.to_string(),
            provider,
            servers,
            ldap_server,
        }))
    }
}
