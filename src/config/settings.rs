// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Deployment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    /// Fake detector for every model, in-memory counts
    Dev,
    /// Real detectors, durable counts
    Prod,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Dev => write!(f, "dev"),
            Environment::Prod => write!(f, "prod"),
        }
    }
}

/// Count repository backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RepoKind {
    #[value(name = "in_memory")]
    InMemory,
    Postgres,
    Mongo,
}

impl fmt::Display for RepoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoKind::InMemory => write!(f, "in_memory"),
            RepoKind::Postgres => write!(f, "postgres"),
            RepoKind::Mongo => write!(f, "mongo"),
        }
    }
}

/// Object counter service configuration
///
/// Every option can be given on the command line or through the
/// environment (a local `.env` file is loaded first by the binary).
#[derive(Parser, Debug, Clone)]
#[command(name = "object-counter")]
#[command(about = "Counts objects detected in uploaded images", long_about = None)]
pub struct CounterConfig {
    /// Deployment mode (dev or prod)
    #[arg(long = "env", env = "ENV", value_enum, ignore_case = true, default_value_t = Environment::Dev)]
    pub env: Environment,

    /// Count repository override (in_memory, postgres, mongo)
    #[arg(long, env = "COUNT_REPO", value_enum, ignore_case = true)]
    pub count_repo: Option<RepoKind>,

    /// Address the HTTP server binds to
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:5000")]
    pub listen_addr: String,

    /// Maximum accepted request body in bytes
    #[arg(long, env = "MAX_CONTENT_LENGTH", default_value_t = 16 * 1024 * 1024)]
    pub max_content_length: usize,

    /// Model server host
    #[arg(long, env = "TFS_HOST", default_value = "localhost")]
    pub tfs_host: String,

    /// Model server REST port
    #[arg(long, env = "TFS_PORT", default_value_t = 8501)]
    pub tfs_port: u16,

    /// Model server request timeout in seconds
    #[arg(long, env = "TFS_TIMEOUT_SECS", default_value_t = 30)]
    pub tfs_timeout_secs: u64,

    /// Class-index-to-name JSON file (embedded MSCOCO table when unset)
    #[arg(long, env = "LABEL_MAP_PATH")]
    pub label_map_path: Option<PathBuf>,

    #[arg(long, env = "POSTGRES_HOST", default_value = "localhost")]
    pub postgres_host: String,

    #[arg(long, env = "POSTGRES_PORT", default_value_t = 5432)]
    pub postgres_port: u16,

    #[arg(long, env = "POSTGRES_USER", default_value = "postgres")]
    pub postgres_user: String,

    #[arg(long, env = "POSTGRES_PASSWORD", default_value = "postgres", hide_env_values = true)]
    pub postgres_password: String,

    #[arg(long, env = "POSTGRES_DB", default_value = "counter")]
    pub postgres_db: String,

    #[arg(long, env = "POSTGRES_MAX_CONNECTIONS", default_value_t = 5)]
    pub postgres_max_connections: u32,

    #[arg(long, env = "MONGO_HOST", default_value = "localhost")]
    pub mongo_host: String,

    #[arg(long, env = "MONGO_PORT", default_value_t = 27017)]
    pub mongo_port: u16,

    #[arg(long, env = "MONGO_USER")]
    pub mongo_user: Option<String>,

    #[arg(long, env = "MONGO_PASSWORD", hide_env_values = true)]
    pub mongo_password: Option<String>,

    #[arg(long, env = "MONGO_DB", default_value = "counter")]
    pub mongo_db: String,

    /// Write prediction overlays for every request into this directory
    #[arg(long, env = "DEBUG_IMAGE_DIR")]
    pub debug_image_dir: Option<PathBuf>,
}

impl CounterConfig {
    /// Dev-mode configuration that ignores the process environment
    pub fn new_for_test() -> Self {
        Self {
            env: Environment::Dev,
            count_repo: None,
            listen_addr: "127.0.0.1:0".to_string(),
            max_content_length: 16 * 1024 * 1024,
            tfs_host: "localhost".to_string(),
            tfs_port: 8501,
            tfs_timeout_secs: 5,
            label_map_path: None,
            postgres_host: "localhost".to_string(),
            postgres_port: 5432,
            postgres_user: "postgres".to_string(),
            postgres_password: "postgres".to_string(),
            postgres_db: "counter".to_string(),
            postgres_max_connections: 1,
            mongo_host: "localhost".to_string(),
            mongo_port: 27017,
            mongo_user: None,
            mongo_password: None,
            mongo_db: "counter".to_string(),
            debug_image_dir: None,
        }
    }

    /// Repository used for this deployment
    ///
    /// `COUNT_REPO` wins; otherwise dev uses memory and prod uses Postgres.
    pub fn repo_kind(&self) -> RepoKind {
        match (self.count_repo, self.env) {
            (Some(kind), _) => kind,
            (None, Environment::Dev) => RepoKind::InMemory,
            (None, Environment::Prod) => RepoKind::Postgres,
        }
    }

    pub fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.postgres_user,
            self.postgres_password,
            self.postgres_host,
            self.postgres_port,
            self.postgres_db
        )
    }

    pub fn mongo_uri(&self) -> String {
        match (&self.mongo_user, &self.mongo_password) {
            (Some(user), Some(password)) => format!(
                "mongodb://{}:{}@{}:{}",
                user, password, self.mongo_host, self.mongo_port
            ),
            _ => format!("mongodb://{}:{}", self.mongo_host, self.mongo_port),
        }
    }

    pub fn tfs_timeout(&self) -> Duration {
        Duration::from_secs(self.tfs_timeout_secs)
    }
}
