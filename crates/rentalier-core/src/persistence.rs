use std::path::Path;
use std::path::PathBuf;

use crate::state::Preferences;

#[derive(Debug, thiserror::Error)]
pub enum PreferencesError {
    #[error("preferences io: {0}")]
    Io(#[from] std::io::Error),
    #[error("preferences json: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON file holding the flags that survive a session: theme, onboarding,
/// and which milestone celebrations were already shown.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PreferencesError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file yields default preferences.
    pub fn load(&self) -> Result<Preferences, PreferencesError> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }
        let bytes = std::fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn save(&self, preferences: &Preferences) -> Result<(), PreferencesError> {
        let encoded = serde_json::to_vec_pretty(preferences)?;
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, encoded)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }
}
