//! SurrealDB connection setup
//!
//! [`ConnectTarget`] names where the roster lives; [`connect`] opens it and
//! selects the namespace/database. Resolution order from the environment:
//!
//! 1. `SURREALDB_ENDPOINT` + `SURREALDB_USERNAME` + `SURREALDB_PASSWORD`
//!    (remote, authenticated)
//! 2. `SURREALDB_URL` (any engine URL, unauthenticated)
//! 3. surrealkv under `CALLSHEET_DB_PATH`, default `.callsheet/db`

use std::path::PathBuf;

use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::Surreal;
use tracing::{info, instrument};

use crate::error::StateError;
use crate::Result;

const DEFAULT_NAMESPACE: &str = "callsheet";
const DEFAULT_DATABASE: &str = "main";
const DEFAULT_LOCAL_PATH: &str = ".callsheet/db";

/// Credentials and location of a remote SurrealDB instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudConfig {
    /// WebSocket endpoint, e.g. `wss://xxx.aws-use1.surrealdb.cloud`
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub namespace: String,
    pub database: String,
    /// Sign in as a root user instead of a database user
    pub is_root: bool,
}

impl CloudConfig {
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            is_root: false,
        }
    }

    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = ns.into();
        self
    }

    pub fn with_database(mut self, db: impl Into<String>) -> Self {
        self.database = db.into();
        self
    }

    pub fn with_root(mut self, is_root: bool) -> Self {
        self.is_root = is_root;
        self
    }

    /// `None` unless endpoint, username and password are all set.
    ///
    /// `SURREALDB_NAMESPACE`, `SURREALDB_DATABASE` and `SURREALDB_ROOT`
    /// (`"true"` for root users) are optional.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(
            lookup("SURREALDB_ENDPOINT")?,
            lookup("SURREALDB_USERNAME")?,
            lookup("SURREALDB_PASSWORD")?,
        );
        if let Some(ns) = lookup("SURREALDB_NAMESPACE") {
            config.namespace = ns;
        }
        if let Some(db) = lookup("SURREALDB_DATABASE") {
            config.database = db;
        }
        config.is_root = lookup("SURREALDB_ROOT")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Some(config)
    }
}

/// Where a roster is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectTarget {
    /// Process-local, discarded on drop
    Memory,
    /// Any URL the `any` engine understands
    Url(String),
    /// Authenticated remote instance
    Cloud(CloudConfig),
    /// surrealkv directory, created if missing
    Local(PathBuf),
}

impl ConnectTarget {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(config) = CloudConfig::from_lookup(&lookup) {
            return ConnectTarget::Cloud(config);
        }
        if let Some(url) = lookup("SURREALDB_URL") {
            return ConnectTarget::Url(url);
        }
        let path = lookup("CALLSHEET_DB_PATH").unwrap_or_else(|| DEFAULT_LOCAL_PATH.to_string());
        ConnectTarget::Local(PathBuf::from(path))
    }

    fn describe(&self) -> String {
        match self {
            ConnectTarget::Memory => "mem://".to_string(),
            ConnectTarget::Url(url) => url.clone(),
            ConnectTarget::Cloud(config) => config.endpoint.clone(),
            ConnectTarget::Local(path) => format!("surrealkv://{}", path.display()),
        }
    }
}

impl std::fmt::Display for ConnectTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Open `target` and select its namespace and database.
#[instrument(skip(target), fields(target = %target))]
pub(crate) async fn connect(target: &ConnectTarget) -> Result<Surreal<Any>> {
    if let ConnectTarget::Local(path) = target {
        std::fs::create_dir_all(path).map_err(|e| {
            StateError::Connection(format!(
                "Failed to create database directory {}: {}",
                path.display(),
                e
            ))
        })?;
    }

    let url = target.describe();
    let db = surrealdb::engine::any::connect(url.as_str())
        .await
        .map_err(|e| StateError::Connection(format!("Failed to connect to {}: {}", url, e)))?;

    let (namespace, database) = match target {
        ConnectTarget::Cloud(config) => {
            signin(&db, config).await?;
            (config.namespace.as_str(), config.database.as_str())
        }
        _ => (DEFAULT_NAMESPACE, DEFAULT_DATABASE),
    };

    db.use_ns(namespace).use_db(database).await.map_err(|e| {
        StateError::Connection(format!("Failed to select {}/{}: {}", namespace, database, e))
    })?;

    info!("Connected to {}", url);
    Ok(db)
}

async fn signin(db: &Surreal<Any>, config: &CloudConfig) -> Result<()> {
    let outcome = if config.is_root {
        db.signin(Root {
            username: &config.username,
            password: &config.password,
        })
        .await
    } else {
        db.signin(Database {
            namespace: &config.namespace,
            database: &config.database,
            username: &config.username,
            password: &config.password,
        })
        .await
    };
    outcome
        .map(|_| ())
        .map_err(|e| StateError::Connection(format!("Authentication failed: {}", e)))
}
