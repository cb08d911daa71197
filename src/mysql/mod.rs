// ABOUTME: MySQL target handle for receiving migrated tables
// ABOUTME: Parses target host options and opens the single target connection

pub mod writer;

use crate::error::MigrationError;
use anyhow::{bail, Context, Result};
use mysql_async::{Conn, OptsBuilder};
use std::fmt;

/// Port used when `--mysql` names a host without one
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Connection settings for the target server
#[derive(Clone)]
pub struct TargetOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl TargetOptions {
    /// Build options from the CLI values; `host` may carry a `:port` suffix
    pub fn new(host: &str, user: &str, password: &str, database: &str) -> Result<Self> {
        let (host, port) = parse_host_port(host)?;

        if database.trim().is_empty() {
            bail!("Target database name cannot be empty");
        }

        Ok(Self {
            host,
            port,
            user: user.to_string(),
            password: password.to_string(),
            database: database.to_string(),
        })
    }

    fn to_opts_builder(&self) -> OptsBuilder {
        OptsBuilder::default()
            .ip_or_hostname(self.host.clone())
            .tcp_port(self.port)
            .user(Some(self.user.clone()))
            .pass(Some(self.password.clone()))
            .db_name(Some(self.database.clone()))
    }
}

// Never print the password
impl fmt::Debug for TargetOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// Split `host`, `host:port` or `[v6addr]:port` into its parts
///
/// # Examples
///
/// ```
/// # use sqlite_mysql_migrator::mysql::parse_host_port;
/// assert_eq!(parse_host_port("db.local").unwrap(), ("db.local".to_string(), 3306));
/// assert_eq!(parse_host_port("db.local:3307").unwrap(), ("db.local".to_string(), 3307));
/// assert_eq!(parse_host_port("[::1]:3308").unwrap(), ("::1".to_string(), 3308));
/// ```
pub fn parse_host_port(value: &str) -> Result<(String, u16)> {
    let value = value.trim();
    if value.is_empty() {
        bail!("MySQL host cannot be empty");
    }

    if let Some(rest) = value.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .with_context(|| format!("Unterminated IPv6 address in MySQL host '{}'", value))?;
        let port = match tail.strip_prefix(':') {
            Some(port) => parse_port(port, value)?,
            None if tail.is_empty() => DEFAULT_MYSQL_PORT,
            None => bail!("Invalid MySQL host '{}'", value),
        };
        return Ok((host.to_string(), port));
    }

    match value.split_once(':') {
        // A bare IPv6 address has several colons and no port
        Some(_) if value.matches(':').count() > 1 => Ok((value.to_string(), DEFAULT_MYSQL_PORT)),
        Some((host, port)) => {
            if host.is_empty() {
                bail!("MySQL host cannot be empty");
            }
            Ok((host.to_string(), parse_port(port, value)?))
        }
        None => Ok((value.to_string(), DEFAULT_MYSQL_PORT)),
    }
}

fn parse_port(port: &str, value: &str) -> Result<u16> {
    port.parse::<u16>()
        .ok()
        .filter(|p| *p != 0)
        .with_context(|| format!("Invalid port '{}' in MySQL host '{}'", port, value))
}

/// Connect to the target MySQL database
///
/// # Errors
///
/// Returns [`MigrationError::Connection`] if the server is unreachable, the
/// credentials are rejected or the database does not exist.
pub async fn connect_mysql(options: &TargetOptions) -> Result<Conn> {
    tracing::info!(
        "Connecting to MySQL at {}:{} (database '{}')",
        options.host,
        options.port,
        options.database
    );

    let conn = Conn::new(options.to_opts_builder())
        .await
        .map_err(|e| MigrationError::connection("mysql", e))
        .with_context(|| {
            format!(
                "Failed to connect to MySQL at {}:{} as '{}'",
                options.host, options.port, options.user
            )
        })?;

    tracing::debug!("Successfully connected to MySQL");

    Ok(conn)
}
