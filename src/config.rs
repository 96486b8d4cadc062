//! On-disk configuration
//!
//! Stored as JSON under the user config directory. Loading is forgiving: a
//! missing or unparsable file yields defaults. Saving merges over whatever
//! is on disk so keys written by other versions survive a round-trip.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What a bare invocation (no subcommand) captures
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShortcutAction {
    #[default]
    FullScreen,
    Region,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub shortcut_action: ShortcutAction,
    /// Output directory override; `None` uses `Pictures/Screenshots`
    pub save_directory: Option<PathBuf>,
}

/// Path of the config file: `<config dir>/ninjashot/config.json`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ninjashot").join("config.json"))
}

impl Config {
    pub fn load() -> Config {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Config::default(),
        }
    }

    fn load_from(path: &std::path::Path) -> Config {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    log::warn!("unreadable config at {}: {}", path.display(), err);
                }
                return Config::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("malformed config at {}: {}", path.display(), err);
                Config::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path =
            config_path().ok_or_else(|| anyhow::anyhow!("no config directory available"))?;
        self.save_to(&path)
    }

    /// Merge this config's fields over the existing file, preserving keys
    /// this version does not know about
    fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let mut merged = std::fs::read_to_string(path)
            .ok()
            .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
            .filter(serde_json::Value::is_object)
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()));

        let own = serde_json::to_value(self)?;
        if let (Some(merged), Some(own)) = (merged.as_object_mut(), own.as_object()) {
            for (key, value) in own {
                merged.insert(key.clone(), value.clone());
            }
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&merged)?)?;
        Ok(())
    }
}
