// Light/dark preference mirrored to the durable store

use crate::durable::{DurableStore, THEME_KEY};
use crate::models::Theme;
use tracing::{debug, error, warn};

/// Current theme, written back to the durable store on every change
pub struct ThemePreference<S: DurableStore> {
    durable: S,
    current: Theme,
}

impl<S: DurableStore> ThemePreference<S> {
    /// Read the stored preference; anything but `"dark"` means light
    pub fn load(durable: S) -> Self {
        let current = match durable.get(THEME_KEY) {
            Ok(Some(raw)) if raw.trim() == Theme::Dark.as_str() => Theme::Dark,
            Ok(_) => Theme::Light,
            Err(e) => {
                warn!(error = ?e, "Failed to read theme preference, using light");
                Theme::Light
            }
        };

        debug!(theme = %current, "Loaded theme preference");
        Self { durable, current }
    }

    /// Theme in effect for this session
    pub fn current(&self) -> Theme {
        self.current
    }

    /// Switch to `theme` and persist it; a failed write is only logged
    pub fn set(&mut self, theme: Theme) -> Theme {
        self.current = theme;
        if let Err(e) = self.durable.set(THEME_KEY, theme.as_str()) {
            error!(error = ?e, theme = %theme, "Failed to save theme preference");
        }
        self.current
    }

    /// Flip between light and dark, returning the new theme
    pub fn toggle(&mut self) -> Theme {
        self.set(self.current.toggled())
    }

    /// Underlying durable store
    pub fn durable(&self) -> &S {
        &self.durable
    }

    /// Mutable access to the underlying durable store
    pub fn durable_mut(&mut self) -> &mut S {
        &mut self.durable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::durable::MemoryStore;

    #[test]
    fn test_defaults_to_light() {
        let pref = ThemePreference::load(MemoryStore::new());
        assert_eq!(pref.current(), Theme::Light);
        assert_eq!(pref.durable().write_count(), 0);
    }

    #[test]
    fn test_reads_dark() {
        let pref = ThemePreference::load(MemoryStore::new().with_value(THEME_KEY, "dark"));
        assert_eq!(pref.current(), Theme::Dark);

        let pref = ThemePreference::load(MemoryStore::new().with_value(THEME_KEY, "purple"));
        assert_eq!(pref.current(), Theme::Light);
    }

    #[test]
    fn test_theme_read_failure() {
        let mut durable = MemoryStore::new().with_value(THEME_KEY, "dark");
        durable.set_fail_reads(true);

        let pref = ThemePreference::load(durable);
        assert_eq!(pref.current(), Theme::Light);
        assert_eq!(pref.durable().write_count(), 0);
    }

    #[test]
    fn test_toggle_persists() {
        let mut pref = ThemePreference::load(MemoryStore::new());

        assert_eq!(pref.toggle(), Theme::Dark);
        assert_eq!(pref.durable().raw(THEME_KEY), Some("dark"));

        assert_eq!(pref.toggle(), Theme::Light);
        assert_eq!(pref.durable().raw(THEME_KEY), Some("light"));
        assert_eq!(pref.durable().write_count(), 2);
    }

    #[test]
    fn test_write_failure_keeps_choice() {
        let mut pref = ThemePreference::load(MemoryStore::new());
        pref.durable_mut().set_fail_writes(true);

        assert_eq!(pref.set(Theme::Dark), Theme::Dark);
        assert_eq!(pref.current(), Theme::Dark);
        assert!(pref.durable().raw(THEME_KEY).is_none());
    }
}
