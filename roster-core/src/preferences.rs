//! Persisted theme and view mode

use roster_model::{Preferences, Theme, ViewMode};
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::RosterResult;
use crate::storage::KeyValueStore;

pub const THEME_KEY: &str = "theme";
pub const VIEW_MODE_KEY: &str = "view_mode";

#[derive(Debug)]
pub struct PreferenceStore {
    storage: Arc<dyn KeyValueStore>,
    state: watch::Sender<Preferences>,
}

impl PreferenceStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(Preferences::default());
        Self { storage, state }
    }

    /// Read persisted values; anything unrecognized falls back to the
    /// default.
    pub async fn load(&self) -> RosterResult<Preferences> {
        let theme = match self.storage.get(THEME_KEY).await? {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                tracing::warn!("[Preferences] Ignoring stored theme: {}", err);
                Theme::default()
            }),
            None => Theme::default(),
        };
        let view_mode = match self.storage.get(VIEW_MODE_KEY).await? {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                tracing::warn!("[Preferences] Ignoring stored view mode: {}", err);
                ViewMode::default()
            }),
            None => ViewMode::default(),
        };

        let preferences = Preferences { theme, view_mode };
        self.state.send_replace(preferences);
        Ok(preferences)
    }

    pub async fn toggle_theme(&self) -> RosterResult<Theme> {
        let next = self.state.borrow().theme.toggled();
        self.set_theme(next).await?;
        Ok(next)
    }

    pub async fn set_theme(&self, theme: Theme) -> RosterResult<()> {
        self.state.send_modify(|prefs| prefs.theme = theme);
        self.storage
            .set(THEME_KEY, theme.as_str().to_string())
            .await?;
        Ok(())
    }

    pub async fn set_view_mode(&self, view_mode: ViewMode) -> RosterResult<()> {
        self.state.send_modify(|prefs| prefs.view_mode = view_mode);
        self.storage
            .set(VIEW_MODE_KEY, view_mode.as_str().to_string())
            .await?;
        Ok(())
    }

    pub fn current(&self) -> Preferences {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Preferences> {
        self.state.subscribe()
    }
}
