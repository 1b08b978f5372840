//! Persisted user preferences.
//!
//! Stored as JSON at `~/.shell-tabs/preferences.json`. A save is staged next
//! to the target as `<name>.partial` and renamed over it.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use super::ShellKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub shell_kind: ShellKind,
}

pub fn default_preferences_path() -> PathBuf {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".shell-tabs").join("preferences.json")
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("preferences.json"));
    name.push(".partial");
    path.with_file_name(name)
}

impl Preferences {
    /// Load preferences, falling back to defaults when the file doesn't exist yet.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let prefs = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid preferences JSON at {}", path.display()))?;
        Ok(prefs)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let data = serde_json::to_vec_pretty(self).context("Failed to serialize preferences")?;

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create preferences folder {}", dir.display()))?;
        }
        let staged = staging_path(path);
        fs::write(&staged, data)
            .with_context(|| format!("Cannot stage preferences at {}", staged.display()))?;
        fs::rename(&staged, path)
            .with_context(|| format!("Cannot move staged preferences onto {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.shell_kind, ShellKind::Bash);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");
        let prefs = Preferences {
            shell_kind: ShellKind::Fish,
        };
        prefs.save(&path).unwrap();

        assert!(!staging_path(&path).exists());
        assert!(staging_path(&path).ends_with("preferences.json.partial"));
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"fish\""));
        assert_eq!(Preferences::load(&path).unwrap(), prefs);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Preferences::load(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid preferences JSON"));
    }

    #[test]
    fn test_missing_field_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{}").unwrap();
        assert_eq!(Preferences::load(&path).unwrap().shell_kind, ShellKind::Bash);
    }
}
