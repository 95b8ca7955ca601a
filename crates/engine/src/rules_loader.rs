// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Loads the `RULES_PATH` document the Signal Evaluator runs against.

use crate::config_hotreload::{HotReloadedConfig, ReloadError};
use gateway_core::RuleSet;
use std::path::Path;

pub struct RulesLoader {
    config: HotReloadedConfig<RuleSet>,
}

impl RulesLoader {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReloadError> {
        Ok(Self { config: HotReloadedConfig::load(path.as_ref())? })
    }

    pub fn current(&self) -> std::sync::Arc<RuleSet> {
        self.config.current()
    }

    pub fn reload_if_changed(&self) {
        self.config.reload_if_changed();
    }
}
