// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Loads the `POLICY_PATH` document the built-in policy evaluator runs
//! against.

use crate::config_hotreload::{HotReloadedConfig, ReloadError};
use gateway_core::PolicyDocument;
use std::path::Path;

pub struct PolicyLoader {
    config: HotReloadedConfig<PolicyDocument>,
}

impl PolicyLoader {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReloadError> {
        Ok(Self { config: HotReloadedConfig::load(path.as_ref())? })
    }

    pub fn current(&self) -> std::sync::Arc<PolicyDocument> {
        self.config.current()
    }

    pub fn reload_if_changed(&self) {
        self.config.reload_if_changed();
    }
}
