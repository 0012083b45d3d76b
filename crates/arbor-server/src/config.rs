use std::fs;
use std::path::{Path, PathBuf};

use arbor_crypto::HashAlgorithm;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ServerError, ServerResult};

/// Environment variable overriding the default home directory.
pub const HOME_ENV: &str = "ARBOR_HOME";

const DATA_DIR: &str = "dat";
const LOG_DIR: &str = "log";
const DB_DIR: &str = "db";
const CONFIG_DIR: &str = "cfg";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripleBackend {
    /// Facts are lost on exit.
    Memory,
    #[default]
    Redb,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub home: PathBuf,
    pub triple_backend: TripleBackend,
    /// Fixed for the life of a store.
    pub hash_algorithm: HashAlgorithm,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            home: Self::default_home(),
            triple_backend: TripleBackend::default(),
            hash_algorithm: HashAlgorithm::default(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl ServerConfig {
    /// `$ARBOR_HOME`, else `~/.arbor`.
    pub fn default_home() -> PathBuf {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|h| !h.is_empty()) {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .map(|h| h.join(".arbor"))
            .unwrap_or_else(|| PathBuf::from(".arbor"))
    }

    /// Defaults rooted at `home`.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            ..Self::default()
        }
    }

    /// Read a TOML file. Missing fields take their defaults.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = toml::from_str(&contents)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `path` if given, else `<home>/cfg/arbor.toml` if it exists, else
    /// the defaults.
    pub fn resolve(path: Option<&Path>) -> ServerResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let defaults = Self::default();
        let implicit = defaults.config_path();
        if implicit.exists() {
            Self::load(&implicit)
        } else {
            Ok(defaults)
        }
    }

    pub fn to_toml(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Block payload directory.
    pub fn data_dir(&self) -> PathBuf {
        self.home.join(DATA_DIR)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.home.join(LOG_DIR)
    }

    pub fn db_dir(&self) -> PathBuf {
        self.home.join(DB_DIR)
    }

    /// The redb database file.
    pub fn db_path(&self) -> PathBuf {
        self.db_dir().join("graph.redb")
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join(CONFIG_DIR).join("arbor.toml")
    }

    /// Create the home directory layout.
    pub fn create_layout(&self) -> ServerResult<()> {
        for dir in [DATA_DIR, LOG_DIR, DB_DIR, CONFIG_DIR] {
            fs::create_dir_all(self.home.join(dir))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::with_home("/srv/arbor");
        assert_eq!(c.triple_backend, TripleBackend::Redb);
        assert_eq!(c.hash_algorithm, HashAlgorithm::Sha1);
        assert_eq!(c.log_level, "info");
        assert!(!c.log_json);
    }

    #[test]
    fn layout_paths() {
        let c = ServerConfig::with_home("/srv/arbor");
        assert_eq!(c.data_dir(), PathBuf::from("/srv/arbor/dat"));
        assert_eq!(c.db_path(), PathBuf::from("/srv/arbor/db/graph.redb"));
        assert_eq!(c.config_path(), PathBuf::from("/srv/arbor/cfg/arbor.toml"));
        assert_eq!(c.log_dir(), PathBuf::from("/srv/arbor/log"));
    }

    #[test]
    fn load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arbor.toml");
        fs::write(
            &path,
            "home = \"/data/arbor\"\ntriple_backend = \"memory\"\nhash_algorithm = \"blake3\"\n",
        )
        .unwrap();

        let c = ServerConfig::load(&path).unwrap();
        assert_eq!(c.home, PathBuf::from("/data/arbor"));
        assert_eq!(c.triple_backend, TripleBackend::Memory);
        assert_eq!(c.hash_algorithm, HashAlgorithm::Blake3);
        assert_eq!(c.log_level, "info");
    }

    #[test]
    fn toml_round_trip() {
        let c = ServerConfig::with_home("/srv/arbor");
        let parsed: ServerConfig = toml::from_str(&c.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    fn rejects_unknown_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arbor.toml");
        fs::write(&path, "triple_backend = \"postgres\"\n").unwrap();
        assert!(matches!(ServerConfig::load(&path), Err(ServerError::Toml(_))));
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ServerConfig::load(&dir.path().join("absent.toml")),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn create_layout_makes_all_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let c = ServerConfig::with_home(dir.path().join("home"));
        c.create_layout().unwrap();
        for sub in ["dat", "log", "db", "cfg"] {
            assert!(c.home.join(sub).is_dir());
        }
    }
}
