//! Persisted UI preferences.
//!
//! The only thing that survives a restart is the colour theme, kept as a
//! single string flag in `<home>/settings.json`. Projects and tasks are never
//! written to disk.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::SettingsError;
use crate::fields::Theme;

pub const SETTINGS_FILE: &str = "settings.json";
pub const LOG_FILE: &str = "pd.log";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub theme: Theme,
}

impl Settings {
    /// Load settings, falling back to defaults when the file is missing or unreadable.
    pub fn load(home: &Path) -> Self {
        match Settings::try_load(home) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(event = "settings.load_failed", error = %e, "falling back to defaults");
                Settings::default()
            }
        }
    }

    /// Load settings, reporting a corrupt file instead of hiding it.
    pub fn try_load(home: &Path) -> Result<Self, SettingsError> {
        let path = home.join(SETTINGS_FILE);
        let buf = match fs::read_to_string(&path) {
            Ok(buf) => buf,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(event = "settings.not_found", path = %path.display());
                return Ok(Settings::default());
            }
            Err(e) => {
                return Err(SettingsError::Parse {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })
            }
        };
        serde_json::from_str(&buf).map_err(|e| SettingsError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save settings using atomic write (temp file + rename).
    pub fn save(&self, home: &Path) -> Result<(), SettingsError> {
        let path = home.join(SETTINGS_FILE);
        let write_err = |source| SettingsError::Write {
            path: path.display().to_string(),
            source,
        };

        fs::create_dir_all(home).map_err(write_err)?;
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self).map_err(|e| write_err(e.into()))?;
        let mut f = File::create(&tmp).map_err(write_err)?;
        f.write_all(data.as_bytes()).map_err(write_err)?;
        f.flush().map_err(write_err)?;
        fs::rename(&tmp, &path).map_err(write_err)?;

        debug!(event = "settings.saved", path = %path.display(), theme = self.theme.as_str());
        Ok(())
    }
}

/// What to do with the stored theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeAction {
    Show,
    Toggle,
    Light,
    Dark,
}

/// Settings together with the directory they are saved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub home: PathBuf,
    pub settings: Settings,
}

impl Preferences {
    pub fn load(home: &Path) -> Self {
        Preferences {
            home: home.to_path_buf(),
            settings: Settings::load(home),
        }
    }

    pub fn theme(&self) -> Theme {
        self.settings.theme
    }

    /// Change the theme and save it. The in-memory value is only updated once
    /// the file has been written.
    pub fn set_theme(&mut self, theme: Theme) -> Result<(), SettingsError> {
        let updated = Settings { theme };
        updated.save(&self.home)?;
        self.settings = updated;
        info!(event = "settings.theme_changed", theme = theme.as_str());
        Ok(())
    }

    /// Apply a theme action, returning the theme now in effect.
    pub fn apply(&mut self, action: ThemeAction) -> Result<Theme, SettingsError> {
        let theme = match action {
            ThemeAction::Show => return Ok(self.theme()),
            ThemeAction::Toggle => self.theme().toggled(),
            ThemeAction::Light => Theme::Light,
            ThemeAction::Dark => Theme::Dark,
        };
        self.set_theme(theme)?;
        Ok(theme)
    }
}

/// Directory holding settings and logs: `--home`, else `$PD_HOME`, else `$HOME/.pd`.
pub fn resolve_home(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(dir) = std::env::var("PD_HOME") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".pd")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_defaults_to_light() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load(dir.path()).theme, Theme::Light);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("nested");
        Settings { theme: Theme::Dark }.save(&home).unwrap();

        let raw = fs::read_to_string(home.join(SETTINGS_FILE)).unwrap();
        assert!(raw.contains("\"dark\""));
        assert!(!home.join("settings.json.tmp").exists());
        assert_eq!(Settings::load(&home).theme, Theme::Dark);
    }

    #[test]
    fn test_corrupt_file_is_reported_and_load_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        let err = Settings::try_load(dir.path()).unwrap_err();
        assert_eq!(err.error_code(), "SETTINGS_PARSE_ERROR");
        assert_eq!(Settings::load(dir.path()), Settings::default());
    }

    #[test]
    fn test_unknown_theme_value_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), r#"{"theme":"sepia"}"#).unwrap();
        assert!(Settings::try_load(dir.path()).is_err());
        fs::write(dir.path().join(SETTINGS_FILE), "{}").unwrap();
        assert_eq!(Settings::try_load(dir.path()).unwrap().theme, Theme::Light);
    }

    #[test]
    fn test_preferences_apply() {
        let dir = tempfile::tempdir().unwrap();
        let mut prefs = Preferences::load(dir.path());
        assert_eq!(prefs.apply(ThemeAction::Show).unwrap(), Theme::Light);
        assert!(!dir.path().join(SETTINGS_FILE).exists());

        assert_eq!(prefs.apply(ThemeAction::Toggle).unwrap(), Theme::Dark);
        assert_eq!(Preferences::load(dir.path()).theme(), Theme::Dark);

        assert_eq!(prefs.apply(ThemeAction::Light).unwrap(), Theme::Light);
        assert_eq!(Settings::load(dir.path()).theme, Theme::Light);
    }

    #[test]
    fn test_failed_save_keeps_current_theme() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        let mut prefs = Preferences::load(&blocker.join("home"));
        assert!(prefs.set_theme(Theme::Dark).is_err());
        assert_eq!(prefs.theme(), Theme::Light);
    }

    #[test]
    fn test_resolve_home_prefers_explicit_path() {
        let explicit = Path::new("/tmp/pd-home");
        assert_eq!(resolve_home(Some(explicit)), PathBuf::from("/tmp/pd-home"));
    }
}
