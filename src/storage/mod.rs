// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Count repository implementations
//!
//! - `in_memory`: process-local map, used in `dev` mode and tests
//! - `sql`: transactional store via `sqlx` (Postgres in production)
//! - `mongo`: document store using atomic `$inc`

pub mod in_memory;
pub mod mongo;
pub mod sql;

pub use in_memory::InMemoryCountRepo;
pub use mongo::MongoCountRepo;
pub use sql::SqlCountRepo;

use std::sync::Arc;
use tracing::info;

use crate::config::{CounterConfig, RepoKind};
use crate::domain::{ObjectCountRepo, StorageError};

/// Build the repository selected by `kind`
pub async fn count_repo_strategy(
    kind: RepoKind,
    config: &CounterConfig,
) -> Result<Arc<dyn ObjectCountRepo>, StorageError> {
    info!("Using '{}' count repository", kind);
    let repo: Arc<dyn ObjectCountRepo> = match kind {
        RepoKind::InMemory => Arc::new(InMemoryCountRepo::new()),
        RepoKind::Postgres => Arc::new(
            SqlCountRepo::connect(&config.postgres_url(), config.postgres_max_connections)
                .await?,
        ),
        RepoKind::Mongo => {
            Arc::new(MongoCountRepo::connect(&config.mongo_uri(), &config.mongo_db).await?)
        }
    };
    Ok(repo)
}
