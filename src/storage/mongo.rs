// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Document-store count repository (MongoDB)
//!
//! Increments use the server-side `$inc` operator with upsert, so
//! concurrent requests never lose updates.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOptions, UpdateOptions};
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{ObjectCount, ObjectCountRepo, StorageError};

const COLLECTION: &str = "counter";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CounterDocument {
    object_class: String,
    count: i64,
}

/// Count repository backed by a MongoDB collection
#[derive(Clone)]
pub struct MongoCountRepo {
    collection: Collection<CounterDocument>,
}

impl MongoCountRepo {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StorageError> {
        let client = Client::with_uri_str(uri).await?;
        let collection = client
            .database(database)
            .collection::<CounterDocument>(COLLECTION);
        info!(
            "Connected count repository to document store (db={}, collection={})",
            database, COLLECTION
        );
        Ok(Self { collection })
    }
}

#[async_trait]
impl ObjectCountRepo for MongoCountRepo {
    async fn read_values(
        &self,
        object_classes: Option<&[String]>,
    ) -> Result<Vec<ObjectCount>, StorageError> {
        let filter = match object_classes {
            None => doc! {},
            Some([]) => return Ok(Vec::new()),
            Some(classes) => doc! { "object_class": { "$in": classes.to_vec() } },
        };
        let options = FindOptions::builder()
            .sort(doc! { "object_class": 1 })
            .build();

        let documents: Vec<CounterDocument> = self
            .collection
            .find(filter, options)
            .await?
            .try_collect()
            .await?;

        documents
            .into_iter()
            .map(|d| match u64::try_from(d.count) {
                Ok(count) => Ok(ObjectCount::new(d.object_class, count)),
                Err(_) => Err(StorageError::CountOutOfRange {
                    object_class: d.object_class,
                    value: d.count.to_string(),
                }),
            })
            .collect()
    }

    async fn update_values(&self, new_values: &[ObjectCount]) -> Result<(), StorageError> {
        let deltas = new_values
            .iter()
            .map(|v| {
                i64::try_from(v.count)
                    .map(|delta| (v.object_class.as_str(), delta))
                    .map_err(|_| StorageError::CountOutOfRange {
                        object_class: v.object_class.clone(),
                        value: v.count.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (object_class, delta) in deltas {
            let options = UpdateOptions::builder().upsert(true).build();
            self.collection
                .update_one(
                    doc! { "object_class": object_class },
                    doc! { "$inc": { "count": delta } },
                    options,
                )
                .await?;
            debug!("Incremented '{}' by {}", object_class, delta);
        }
        Ok(())
    }
}
