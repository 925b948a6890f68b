// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Small UI preferences persisted between sessions.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::logic::search::{DEFAULT_PAGE_SIZE, PAGE_SIZES};
use crate::logic::validation::NameSuffix;

const APP_DIR: &str = "labinv";
const FILE_NAME: &str = "preferences.json";

/// User preferences; unknown or missing keys fall back to defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Inventory file reopened on startup.
    pub last_inventory: Option<PathBuf>,
    pub page_size: usize,
    /// Suffix preselected when batch-renaming.
    pub name_suffix: NameSuffix,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            last_inventory: None,
            page_size: DEFAULT_PAGE_SIZE,
            name_suffix: NameSuffix::None,
        }
    }
}

impl Preferences {
    /// Load preferences from `path`. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read preferences: {:?}", path))?;
        let mut prefs: Self =
            serde_json::from_str(&content).context("Failed to parse preferences JSON")?;
        if !PAGE_SIZES.contains(&prefs.page_size) {
            prefs.page_size = DEFAULT_PAGE_SIZE;
        }
        Ok(prefs)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize preferences")?;
        fs::write(path, json).with_context(|| format!("Failed to write preferences: {:?}", path))
    }
}

/// Location of the preferences file.
///
/// Checks `LABINV_CONFIG_DIR`, then `XDG_CONFIG_HOME/labinv`, then
/// `HOME/.config/labinv`. `None` when no base directory is known.
pub fn default_path() -> Option<PathBuf> {
    resolve_path(|key| std::env::var_os(key).filter(|v| !v.is_empty()))
}

fn resolve_path(var: impl Fn(&str) -> Option<std::ffi::OsString>) -> Option<PathBuf> {
    if let Some(dir) = var("LABINV_CONFIG_DIR") {
        return Some(PathBuf::from(dir).join(FILE_NAME));
    }
    if let Some(dir) = var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(dir).join(APP_DIR).join(FILE_NAME));
    }
    var("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(FILE_NAME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let prefs = Preferences::load(&tmp.path().join("absent.json")).unwrap();
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join(FILE_NAME);
        let prefs = Preferences {
            last_inventory: Some(PathBuf::from("/data/inventory.json")),
            page_size: 25,
            name_suffix: NameSuffix::IndexLetter,
        };

        prefs.save(&path).unwrap();
        assert_eq!(Preferences::load(&path).unwrap(), prefs);
    }

    #[test]
    fn partial_and_invalid_values_fall_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(FILE_NAME);
        fs::write(&path, r#"{"page_size": 7}"#).unwrap();

        let prefs = Preferences::load(&path).unwrap();
        assert_eq!(prefs.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(prefs.name_suffix, NameSuffix::None);

        fs::write(&path, "not json").unwrap();
        assert!(Preferences::load(&path).is_err());
    }

    #[test]
    fn path_resolution_order() {
        let env = |pairs: &'static [(&'static str, &'static str)]| {
            move |key: &str| {
                pairs
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| OsString::from(*v))
            }
        };

        assert_eq!(
            resolve_path(env(&[("LABINV_CONFIG_DIR", "/cfg"), ("HOME", "/home/u")])),
            Some(PathBuf::from("/cfg/preferences.json"))
        );
        assert_eq!(
            resolve_path(env(&[("XDG_CONFIG_HOME", "/xdg"), ("HOME", "/home/u")])),
            Some(PathBuf::from("/xdg/labinv/preferences.json"))
        );
        assert_eq!(
            resolve_path(env(&[("HOME", "/home/u")])),
            Some(PathBuf::from("/home/u/.config/labinv/preferences.json"))
        );
        assert_eq!(resolve_path(env(&[])), None);
    }
}
