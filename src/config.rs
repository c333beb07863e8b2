/// Runtime configuration
///
/// Tool names and database locations. Everything has a default matching a
/// stock plocate install, so a config file is optional.

use crate::core::DatabaseKind;
use crate::error::{LocateError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Default system database written by the distro's updatedb timer
pub const DEFAULT_DB_PATH: &str = "/var/lib/plocate/plocate.db";

/// Secondary database covering removable media
pub const MEDIA_DB_PATH: &str = "/var/lib/plocate/media.db";

/// Where removable media gets mounted
pub const MEDIA_SCAN_PATH: &str = "/run/media";

/// Env var that points at an alternate config file
pub const CONFIG_ENV: &str = "PLOCATE_RUNNER_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search_tool: PathBuf,
    pub update_tool: PathBuf,
    pub privilege_helper: PathBuf,
    pub system_db: PathBuf,
    pub media_db: PathBuf,
    pub media_scan_path: PathBuf,
    /// Paths to prune from the system database on update
    pub exclude_paths: Vec<String>,
    /// Program that opens results; the desktop default when unset
    pub opener: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_tool: PathBuf::from("plocate"),
            update_tool: PathBuf::from("updatedb"),
            privilege_helper: PathBuf::from("pkexec"),
            system_db: PathBuf::from(DEFAULT_DB_PATH),
            media_db: PathBuf::from(MEDIA_DB_PATH),
            media_scan_path: PathBuf::from(MEDIA_SCAN_PATH),
            exclude_paths: Vec::new(),
            opener: None,
        }
    }
}

impl Config {
    /// Load the config from `$PLOCATE_RUNNER_CONFIG` or the user config dir
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    /// Load the config from a specific file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve which file `load` would read
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(custom) = std::env::var(CONFIG_ENV) {
            if !custom.trim().is_empty() {
                return Some(PathBuf::from(custom));
            }
        }

        dirs::config_dir().map(|dir| dir.join("plocate-runner").join("config.json"))
    }

    fn validate(&self) -> Result<()> {
        let tools = [
            ("search_tool", &self.search_tool),
            ("update_tool", &self.update_tool),
            ("privilege_helper", &self.privilege_helper),
            ("system_db", &self.system_db),
            ("media_db", &self.media_db),
            ("media_scan_path", &self.media_scan_path),
        ];

        for (name, value) in tools {
            if value.as_os_str().is_empty() {
                return Err(LocateError::Config(format!("'{}' must not be empty", name)));
            }
        }

        if matches!(&self.opener, Some(opener) if opener.trim().is_empty()) {
            return Err(LocateError::Config("'opener' must not be empty".to_string()));
        }

        Ok(())
    }

    /// Database file backing a given source
    pub fn database_path(&self, database: DatabaseKind) -> &Path {
        match database {
            DatabaseKind::System => &self.system_db,
            DatabaseKind::Media => &self.media_db,
        }
    }

    /// System database, plus media when that database exists on disk
    pub fn default_targets(&self) -> BTreeSet<DatabaseKind> {
        let mut targets = BTreeSet::from([DatabaseKind::System]);
        if self.media_db.exists() {
            targets.insert(DatabaseKind::Media);
        }
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.system_db, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.media_db, PathBuf::from(MEDIA_DB_PATH));
        assert_eq!(config.privilege_helper, PathBuf::from("pkexec"));
        assert!(config.exclude_paths.is_empty());
        assert!(config.opener.is_none());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "search_tool": "/opt/plocate/bin/plocate", "exclude_paths": ["/mnt/backup"] }"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.search_tool, PathBuf::from("/opt/plocate/bin/plocate"));
        assert_eq!(config.exclude_paths, vec!["/mnt/backup".to_string()]);
        assert_eq!(config.system_db, PathBuf::from(DEFAULT_DB_PATH));
    }

    #[test]
    fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        match Config::load_from(&path) {
            Err(LocateError::Serialization(_)) => {}
            other => panic!("Expected Serialization error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_tool_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "search_tool": "" }"#).unwrap();

        match Config::load_from(&path) {
            Err(LocateError::Config(msg)) => assert!(msg.contains("search_tool")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_opener_setting() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, r#"{ "opener": "mimeopen" }"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.opener.as_deref(), Some("mimeopen"));

        std::fs::write(&path, r#"{ "opener": "  " }"#).unwrap();
        assert!(matches!(Config::load_from(&path), Err(LocateError::Config(_))));
    }

    #[test]
    fn test_default_targets_follow_media_db() {
        let dir = TempDir::new().unwrap();
        let mut config = Config {
            media_db: dir.path().join("media.db"),
            ..Config::default()
        };
        assert_eq!(config.default_targets(), BTreeSet::from([DatabaseKind::System]));

        std::fs::write(&config.media_db, b"").unwrap();
        assert_eq!(
            config.default_targets(),
            BTreeSet::from([DatabaseKind::System, DatabaseKind::Media])
        );

        config.media_db = dir.path().join("gone.db");
        assert!(!config.default_targets().contains(&DatabaseKind::Media));
    }
}
