use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::preferences::PreferenceSet;

const STORE_DIR: &str = "tailor";
const STORE_FILE: &str = "preferences.json";

/// What survives between sessions: the preference set and its description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedPreferences {
    #[serde(default)]
    pub preferences: PreferenceSet,
    #[serde(default)]
    pub description: String,
}

pub fn preferences_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join(STORE_DIR).join(STORE_FILE))
}

/// Load persisted preferences, falling back to defaults on a missing or
/// corrupt file.
pub fn load_preferences(path: &Path) -> PersistedPreferences {
    let Ok(contents) = fs::read_to_string(path) else {
        return PersistedPreferences::default();
    };

    serde_json::from_str(&contents).unwrap_or_default()
}

/// No file locking - last writer wins if multiple instances run simultaneously.
pub fn save_preferences(path: &Path, state: &PersistedPreferences) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string(state).map_err(io::Error::other)?;
    fs::write(path, json)
}

/// Remove the persisted file; a missing file is fine.
pub fn clear_preferences(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
