//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - interval lengths and cycle count
//! - the set of applications shielded during work
//!
//! Configuration is stored at `~/.config/gritlock/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::session::SessionConfig;
use crate::shield::AppSet;

/// Shield-specific configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldConfig {
    #[serde(default)]
    pub applications: AppSet,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/gritlock/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub shield: ShieldConfig,
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed or fails
    /// validation, or if the defaults cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.session.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// The whole config is rejected if the new value breaks validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or is out of range.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.session.validate()?;
        *self = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("session.work_duration_secs").as_deref(), Some("1500"));
        assert_eq!(cfg.get("session.break_after_final_cycle").as_deref(), Some("false"));
        assert_eq!(cfg.get("shield.applications").as_deref(), Some("[]"));
        assert!(cfg.get("session.missing_key").is_none());
    }

    #[test]
    fn set_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.set("session.break_duration_secs", "120").unwrap();
        assert_eq!(cfg.session.break_duration_secs, 120);
    }

    #[test]
    fn set_updates_nested_bool() {
        let mut cfg = Config::default();
        cfg.set("session.break_after_final_cycle", "true").unwrap();
        assert!(cfg.session.break_after_final_cycle);
    }

    #[test]
    fn set_accepts_json_list_for_applications() {
        let mut cfg = Config::default();
        cfg.set("shield.applications", r#"["com.b", "com.a", "com.a"]"#)
            .unwrap();
        assert_eq!(cfg.shield.applications.len(), 2);
        assert!(cfg.shield.applications.contains("com.a"));
    }

    #[test]
    fn set_drops_blank_applications() {
        let mut cfg = Config::default();
        cfg.set("shield.applications", r#"["", "  "]"#).unwrap();
        assert!(cfg.shield.applications.is_empty());

        cfg.set("shield.applications", r#"[" com.a ", "com.a"]"#).unwrap();
        assert_eq!(cfg.shield.applications.iter().collect::<Vec<_>>(), vec!["com.a"]);
    }

    #[test]
    fn load_from_normalizes_applications() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[shield]\napplications = [\" com.a \", \"com.a\", \"\"]\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.shield.applications.len(), 1);
        assert!(cfg.shield.applications.contains("com.a"));
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("session.nonexistent_key", "1").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("session.total_cycles", "many").is_err());
        assert!(cfg.set("session.break_after_final_cycle", "yes").is_err());
    }

    #[test]
    fn set_rejects_zero_duration_and_keeps_old_value() {
        let mut cfg = Config::default();
        assert!(cfg.set("session.work_duration_secs", "0").is_err());
        assert_eq!(cfg.session.work_duration_secs, 1500);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn load_from_reads_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[session]\nwork_duration_secs = 600\n\n[shield]\napplications = [\"com.feed\"]\n",
        )
        .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.session.work_duration_secs, 600);
        assert_eq!(cfg.session.break_duration_secs, 300);
        assert!(cfg.shield.applications.contains("com.feed"));
    }

    #[test]
    fn load_from_rejects_zero_cycles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[session]\ntotal_cycles = 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn save_to_then_load_from() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.session.total_cycles = 6;
        cfg.shield.applications.insert("com.short.video");
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }
}
