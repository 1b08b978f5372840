//! Runtime configuration.
//!
//! Values come from the environment (optionally seeded from a `.env` file)
//! with `SHELL_TABS_` prefixed keys. The shell-kind preference is persisted
//! separately, see [`preferences`].

pub mod preferences;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::backend::DEFAULT_EXEC_TIMEOUT_SECS;

pub use preferences::{Preferences, default_preferences_path};

pub const DEFAULT_PROMPT: &str = "$ ";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Shell flavour offered in the panel's selector.
///
/// Purely a preference: it's stored and shown, live sessions are unaffected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    #[default]
    Bash,
    Zsh,
    Fish,
    Powershell,
    Cmd,
}

impl ShellKind {
    pub const ALL: [ShellKind; 5] = [
        ShellKind::Bash,
        ShellKind::Zsh,
        ShellKind::Fish,
        ShellKind::Powershell,
        ShellKind::Cmd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShellKind::Bash => "bash",
            ShellKind::Zsh => "zsh",
            ShellKind::Fish => "fish",
            ShellKind::Powershell => "powershell",
            ShellKind::Cmd => "cmd",
        }
    }

    /// The next kind in selector order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShellKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| anyhow::anyhow!("Invalid shell kind: {}", s))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory new sessions are spawned in.
    pub working_directory: PathBuf,
    pub prompt: String,
    pub exec_timeout_secs: u64,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub shell_kind: ShellKind,
    /// Where the shell-kind preference is saved; `None` disables persistence.
    pub preferences_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            working_directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            prompt: DEFAULT_PROMPT.to_string(),
            exec_timeout_secs: DEFAULT_EXEC_TIMEOUT_SECS,
            log_dir: default_log_dir(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            shell_kind: ShellKind::default(),
            preferences_path: None,
        }
    }
}

/// `logs/` next to the executable, or in the current directory as a fallback.
pub fn default_log_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("logs")))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

impl Config {
    /// Load from `.env` and the process environment, then apply saved preferences.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;
        let prefs_path = default_preferences_path();
        // An explicit SHELL_TABS_SHELL wins over the saved preference.
        if std::env::var("SHELL_TABS_SHELL").is_err() {
            match Preferences::load(&prefs_path) {
                Ok(prefs) => config.shell_kind = prefs.shell_kind,
                Err(e) => tracing::warn!("Ignoring unreadable preferences: {:#}", e),
            }
        }
        config.preferences_path = Some(prefs_path);
        Ok(config)
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let working_directory = match var("SHELL_TABS_CWD") {
            Some(dir) => {
                let path = PathBuf::from(&dir);
                if !path.is_dir() {
                    anyhow::bail!("SHELL_TABS_CWD is not a directory: {}", dir);
                }
                path
            }
            None => defaults.working_directory,
        };

        let prompt = lookup("SHELL_TABS_PROMPT")
            .filter(|p| !p.is_empty())
            .unwrap_or(defaults.prompt);

        let exec_timeout_secs = match var("SHELL_TABS_EXEC_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid SHELL_TABS_EXEC_TIMEOUT_SECS: {}", raw))?,
            None => defaults.exec_timeout_secs,
        };

        let log_dir = var("SHELL_TABS_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_dir);

        let log_level = var("SHELL_TABS_LOG_LEVEL").unwrap_or(defaults.log_level);

        let shell_kind = match var("SHELL_TABS_SHELL") {
            Some(raw) => raw.parse()?,
            None => defaults.shell_kind,
        };

        Ok(Self {
            working_directory,
            prompt,
            exec_timeout_secs,
            log_dir,
            log_level,
            shell_kind,
            preferences_path: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.exec_timeout_secs, 30);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.shell_kind, ShellKind::Bash);
        assert!(config.preferences_path.is_none());
    }

    #[test]
    fn test_values_from_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_string_lossy().to_string();
        let config = Config::from_lookup(lookup_from(&[
            ("SHELL_TABS_CWD", cwd.as_str()),
            ("SHELL_TABS_PROMPT", "> "),
            ("SHELL_TABS_EXEC_TIMEOUT_SECS", "5"),
            ("SHELL_TABS_LOG_LEVEL", "debug"),
            ("SHELL_TABS_SHELL", "ZSH"),
        ]))
        .unwrap();
        assert_eq!(config.working_directory, dir.path());
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.exec_timeout_secs, 5);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.shell_kind, ShellKind::Zsh);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("SHELL_TABS_EXEC_TIMEOUT_SECS", "soon")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("SHELL_TABS_SHELL", "tcsh")])).is_err());
        assert!(
            Config::from_lookup(lookup_from(&[("SHELL_TABS_CWD", "/definitely/not/here")])).is_err()
        );
    }

    #[test]
    fn test_shell_kind_parse_and_cycle() {
        assert_eq!("powershell".parse::<ShellKind>().unwrap(), ShellKind::Powershell);
        assert_eq!(ShellKind::Bash.next(), ShellKind::Zsh);
        assert_eq!(ShellKind::Cmd.next(), ShellKind::Bash);
        assert_eq!(ShellKind::Fish.to_string(), "fish");
    }

    #[test]
    fn test_shell_kind_serde_lowercase() {
        let json = serde_json::to_string(&ShellKind::Powershell).unwrap();
        assert_eq!(json, "\"powershell\"");
        let kind: ShellKind = serde_json::from_str("\"cmd\"").unwrap();
        assert_eq!(kind, ShellKind::Cmd);
    }
}
