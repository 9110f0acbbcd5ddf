// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod domain;
pub mod storage;
pub mod vision;

pub use config::{build_count_actions, CounterConfig, Environment, RepoKind};
pub use domain::{CountActions, CountDetectedObjects, CountResponse, ModelName, ObjectCount};
