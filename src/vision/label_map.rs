// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Class-index-to-name table for detection models

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

const MSCOCO_LABEL_MAP: &str = include_str!("../../resources/mscoco_label_map.json");

#[derive(Debug, Error)]
pub enum LabelMapError {
    #[error("Failed to read label map {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid label map: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate class id {0} in label map")]
    DuplicateId(i64),
}

#[derive(Debug, Deserialize)]
struct LabelEntry {
    id: i64,
    display_name: String,
}

/// Maps the integer class ids a model emits to display names
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap {
    labels: HashMap<i64, String>,
}

impl LabelMap {
    /// Load from `path`, or the embedded MSCOCO table when `None`
    pub fn load(path: Option<&Path>) -> Result<Self, LabelMapError> {
        match path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| LabelMapError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_json(&json)
            }
            None => Self::mscoco(),
        }
    }

    pub fn mscoco() -> Result<Self, LabelMapError> {
        Self::from_json(MSCOCO_LABEL_MAP)
    }

    /// Parse a `[{"id": .., "display_name": ..}]` document
    pub fn from_json(json: &str) -> Result<Self, LabelMapError> {
        let entries: Vec<LabelEntry> = serde_json::from_str(json)?;
        let mut labels = HashMap::with_capacity(entries.len());
        for entry in entries {
            if labels.insert(entry.id, entry.display_name).is_some() {
                return Err(LabelMapError::DuplicateId(entry.id));
            }
        }
        Ok(Self { labels })
    }

    pub fn get(&self, id: i64) -> Option<&str> {
        self.labels.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
