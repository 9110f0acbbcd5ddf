// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Environment-driven configuration and start-up wiring

pub mod settings;
pub mod wiring;

pub use settings::{CounterConfig, Environment, RepoKind};
pub use wiring::{build_count_actions, build_count_actions_with_repo, ConfigError};
