// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! Generic "reload on mtime change, validate before swap, keep last good on
//! failure" primitive shared by the rules and policy YAML loaders.

use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: serde_yaml::Error },
}

struct Inner<T> {
    value: Arc<T>,
    mtime: Option<SystemTime>,
}

/// Holds the current parsed document plus the mtime it was loaded at.
/// `reload_if_changed` is cheap to call on every tick — it's a `stat(2)`
/// when nothing changed.
pub struct HotReloadedConfig<T> {
    path: PathBuf,
    inner: RwLock<Inner<T>>,
}

impl<T> HotReloadedConfig<T>
where
    T: serde::de::DeserializeOwned + Send + Sync + 'static,
{
    /// Loads `path` for the first time. A missing or invalid file at
    /// startup is an error — unlike later reloads, there is no "last good"
    /// to fall back to yet.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ReloadError> {
        let path = path.into();
        let (value, mtime) = read_and_parse(&path)?;
        Ok(Self {
            path,
            inner: RwLock::new(Inner { value: Arc::new(value), mtime }),
        })
    }

    pub fn current(&self) -> Arc<T> {
        self.inner.read().value.clone()
    }

    /// Re-reads the file only if its mtime has advanced since the last
    /// successful load. On read or parse failure, logs and keeps serving
    /// the previously loaded document.
    pub fn reload_if_changed(&self) {
        let current_mtime = self.inner.read().mtime;
        let disk_mtime = fs::metadata(&self.path).and_then(|meta| meta.modified()).ok();

        if disk_mtime == current_mtime {
            return;
        }

        match read_and_parse(&self.path) {
            Ok((value, mtime)) => {
                let mut inner = self.inner.write();
                inner.value = Arc::new(value);
                inner.mtime = mtime;
                tracing::info!(path = %self.path.display(), "reloaded config");
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "config reload failed, keeping previous version");
            }
        }
    }
}

fn read_and_parse<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<(T, Option<SystemTime>), ReloadError> {
    let contents = fs::read_to_string(path).map_err(|source| ReloadError::Read { path: path.to_path_buf(), source })?;
    let value: T = serde_yaml::from_str(&contents)
        .map_err(|source| ReloadError::Parse { path: path.to_path_buf(), source })?;
    let mtime = fs::metadata(path).and_then(|meta| meta.modified()).ok();
    Ok((value, mtime))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::RuleSet;
    use std::io::Write;

    #[test]
    fn keeps_last_good_on_invalid_reload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rules: []").unwrap();
        let config: HotReloadedConfig<RuleSet> = HotReloadedConfig::load(file.path()).unwrap();
        assert_eq!(config.current().rules.len(), 0);

        // Overwrite with invalid YAML; a stale mtime check might not pick
        // it up immediately in a fast test, so write, then force a reload.
        std::fs::write(file.path(), "not: [valid, yaml: structure").unwrap();
        config.reload_if_changed();
        assert_eq!(config.current().rules.len(), 0);
    }

    #[test]
    fn reloads_on_valid_change() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rules: []").unwrap();
        let config: HotReloadedConfig<RuleSet> = HotReloadedConfig::load(file.path()).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(20));
        std::fs::write(
            file.path(),
            "rules:\n  - name: n\n    kind: stale_pr\n    parameters: {}\n",
        )
        .unwrap();
        config.reload_if_changed();
        assert_eq!(config.current().rules.len(), 1);
    }
}
