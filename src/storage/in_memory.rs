// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-memory count repository
//!
//! Process-local and lost on restart. Intended for the `dev` deployment mode
//! and tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{ObjectCount, ObjectCountRepo, StorageError};

/// Count repository backed by an ordered map
#[derive(Clone, Default)]
pub struct InMemoryCountRepo {
    store: Arc<RwLock<BTreeMap<String, u64>>>,
}

impl InMemoryCountRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored classes
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectCountRepo for InMemoryCountRepo {
    async fn read_values(
        &self,
        object_classes: Option<&[String]>,
    ) -> Result<Vec<ObjectCount>, StorageError> {
        let store = self.store.read().await;

        let values = match object_classes {
            None => store
                .iter()
                .map(|(class, count)| ObjectCount::new(class.clone(), *count))
                .collect(),
            Some(classes) => store
                .iter()
                .filter(|(class, _)| classes.contains(*class))
                .map(|(class, count)| ObjectCount::new(class.clone(), *count))
                .collect(),
        };

        Ok(values)
    }

    async fn update_values(&self, new_values: &[ObjectCount]) -> Result<(), StorageError> {
        let mut store = self.store.write().await;

        // Compute every new total first so a failing batch changes nothing
        let mut staged: BTreeMap<String, u64> = BTreeMap::new();
        for value in new_values {
            let current = staged
                .get(&value.object_class)
                .or_else(|| store.get(&value.object_class))
                .copied()
                .unwrap_or(0);
            let total = current
                .checked_add(value.count)
                .ok_or_else(|| StorageError::CountOutOfRange {
                    object_class: value.object_class.clone(),
                    value: format!("{} + {}", current, value.count),
                })?;
            staged.insert(value.object_class.clone(), total);
        }

        debug!("Updating {} in-memory counters", staged.len());
        store.extend(staged);
        Ok(())
    }
}
