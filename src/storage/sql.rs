// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Relational count repository
//!
//! Built on the `sqlx` `Any` driver: Postgres in production, SQLite for
//! tests and local runs. Every `update_values` call runs in one
//! transaction.

use async_trait::async_trait;
use sqlx::any::{AnyPoolOptions, AnyQueryResult};
use sqlx::{Any, AnyPool, Transaction};
use tracing::{debug, error, info};

use crate::domain::{ObjectCount, ObjectCountRepo, StorageError};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS object_counts (\
     object_class TEXT PRIMARY KEY, \
     count BIGINT NOT NULL DEFAULT 0)";

const UPSERT_INCREMENT: &str = "INSERT INTO object_counts (object_class, count) VALUES ($1, $2) \
     ON CONFLICT (object_class) DO UPDATE SET count = object_counts.count + excluded.count";

const SELECT_ALL: &str = "SELECT object_class, count FROM object_counts ORDER BY object_class";

/// Count repository backed by a SQL database
#[derive(Clone)]
pub struct SqlCountRepo {
    pool: AnyPool,
}

impl SqlCountRepo {
    /// Connect to `database_url` and make sure the schema exists
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StorageError> {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!("Connected count repository to SQL store");
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and make sure the schema exists
    pub async fn from_pool(pool: AnyPool) -> Result<Self, StorageError> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }

    async fn apply_deltas(
        tx: &mut Transaction<'_, Any>,
        new_values: &[ObjectCount],
    ) -> Result<(), StorageError> {
        for value in new_values {
            let delta = to_stored(&value.object_class, value.count)?;
            let result: AnyQueryResult = sqlx::query(UPSERT_INCREMENT)
                .bind(value.object_class.as_str())
                .bind(delta)
                .execute(&mut **tx)
                .await?;
            debug!(
                "Upserted '{}' (+{}), {} row(s) affected",
                value.object_class,
                delta,
                result.rows_affected()
            );
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectCountRepo for SqlCountRepo {
    async fn read_values(
        &self,
        object_classes: Option<&[String]>,
    ) -> Result<Vec<ObjectCount>, StorageError> {
        let rows: Vec<(String, i64)> = match object_classes {
            None => sqlx::query_as(SELECT_ALL).fetch_all(&self.pool).await?,
            Some([]) => Vec::new(),
            Some(classes) => {
                let placeholders: Vec<String> =
                    (1..=classes.len()).map(|i| format!("${}", i)).collect();
                let sql = format!(
                    "SELECT object_class, count FROM object_counts \
                     WHERE object_class IN ({}) ORDER BY object_class",
                    placeholders.join(", ")
                );
                let mut query = sqlx::query_as::<_, (String, i64)>(&sql);
                for class in classes {
                    query = query.bind(class.as_str());
                }
                query.fetch_all(&self.pool).await?
            }
        };

        rows.into_iter()
            .map(|(object_class, count)| from_stored(object_class, count))
            .collect()
    }

    async fn update_values(&self, new_values: &[ObjectCount]) -> Result<(), StorageError> {
        if new_values.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        if let Err(e) = Self::apply_deltas(&mut tx, new_values).await {
            error!("Rolling back count update: {}", e);
            tx.rollback().await?;
            return Err(e);
        }
        tx.commit().await?;
        Ok(())
    }
}

fn to_stored(object_class: &str, count: u64) -> Result<i64, StorageError> {
    i64::try_from(count).map_err(|_| StorageError::CountOutOfRange {
        object_class: object_class.to_string(),
        value: count.to_string(),
    })
}

fn from_stored(object_class: String, count: i64) -> Result<ObjectCount, StorageError> {
    match u64::try_from(count) {
        Ok(count) => Ok(ObjectCount::new(object_class, count)),
        Err(_) => Err(StorageError::CountOutOfRange {
            object_class,
            value: count.to_string(),
        }),
    }
}
