// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution and config file persistence.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use wasserzeichen_core::{EngineConfig, WasserzeichenError};

const CONFIG_FILE: &str = "config.json";
const SETTINGS_DB: &str = "settings.db";

/// The application data directory, created if needed.
pub fn data_dir() -> PathBuf {
    let dir = base_dir().join("wasserzeichen");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        warn!(path = %dir.display(), error = %e, "could not create data directory");
    }
    dir
}

/// Default location of the config file.
pub fn config_path() -> PathBuf {
    data_dir().join(CONFIG_FILE)
}

/// Default location of the settings database.
pub fn settings_db() -> PathBuf {
    data_dir().join(SETTINGS_DB)
}

fn base_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    std::env::temp_dir()
}

/// Load the engine config from `path`, or from `<data_dir>/config.json`.
///
/// A missing file means defaults; an unreadable one is logged and also
/// falls back to defaults.
pub fn load_config(path: Option<&Path>) -> EngineConfig {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
    let Ok(data) = std::fs::read_to_string(&path) else {
        debug!(path = %path.display(), "no config file, using defaults");
        return EngineConfig::default();
    };
    match serde_json::from_str(&data) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
            EngineConfig::default()
        }
    }
}

pub fn persist_config(path: &Path, config: &EngineConfig) -> Result<(), WasserzeichenError> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config(Some(&dir.path().join("absent.json"))), EngineConfig::default());
    }

    #[test]
    fn persisted_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = EngineConfig {
            export_scale: 3.0,
            download_delay_ms: 0,
            ..EngineConfig::default()
        };
        persist_config(&path, &config).unwrap();
        assert_eq!(load_config(Some(&path)), config);
    }

    #[test]
    fn garbage_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_config(Some(&path)), EngineConfig::default());
    }
}
