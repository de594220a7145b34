use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};
use crate::settings::config_dir;

const ANONYMOUS_NAME: &str = "Explorer";

/// The logged-in user. Commands receive one of these explicitly instead of
/// reading shared state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub email: String,
}

impl Session {
    pub fn display_name(&self) -> &str {
        if self.user_name.trim().is_empty() {
            ANONYMOUS_NAME
        } else {
            &self.user_name
        }
    }

    /// The backend wants a numeric owner id on new expenses.
    pub fn numeric_user_id(&self) -> Option<i64> {
        self.user_id.trim().parse().ok()
    }
}

/// Reads and writes the persisted session file.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Self {
        Self::new(config_dir().join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored session, if any. A corrupt file or a blank user id counts
    /// as logged out.
    pub fn load(&self) -> Option<Session> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<Session>(&content) {
            Ok(session) if !session.user_id.trim().is_empty() => Some(session),
            Ok(_) => None,
            Err(e) => {
                log::warn!("ignoring unreadable session file {}: {e}", self.path.display());
                None
            }
        }
    }

    pub fn require(&self) -> Result<Session> {
        self.load().ok_or(TallyError::NotLoggedIn)
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, format!("{json}\n"))?;
        Ok(())
    }

    /// Remove the stored session. Returns false when there was none.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
