/// Settings and API-key persistence
///
/// Everything is resolved once at startup into a `Settings` value that is
/// handed to constructors. Library code never reads the environment.

use crate::embeddings::openai::{DEFAULT_API_BASE, DEFAULT_DIMENSION, DEFAULT_MODEL};
use crate::error::{FastCmdError, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const APP_DIR: &str = ".fastcmd";
const CONFIG_FILE: &str = "config.json";
const DB_FILE: &str = "commands.db";

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_API_BASE: &str = "OPENAI_API_BASE";
pub const ENV_DB_DIR: &str = "FASTCMD_DB_DIR";
pub const ENV_MODEL: &str = "FASTCMD_EMBEDDING_MODEL";
pub const ENV_DIMENSION: &str = "FASTCMD_EMBEDDING_DIM";
pub const ENV_SEARCH_MODE: &str = "FASTCMD_SEARCH_MODE";

/// How search results are offered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Best match only, yes/other confirmation
    #[default]
    Single,
    /// Top three, numbered, pick one then confirm
    Pick,
}

impl SearchMode {
    pub fn top_k(&self) -> usize {
        match self {
            SearchMode::Single => 1,
            SearchMode::Pick => 3,
        }
    }
}

impl FromStr for SearchMode {
    type Err = FastCmdError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "" => Ok(SearchMode::Single),
            "pick" => Ok(SearchMode::Pick),
            other => Err(FastCmdError::Config(format!(
                "unknown search mode '{}' (expected 'single' or 'pick')",
                other
            ))),
        }
    }
}

/// On-disk `config.json`
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(rename = "OPENAI_API_KEY", skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

/// The `~/.fastcmd` directory and the key file inside it
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.fastcmd`
    pub fn from_home() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| FastCmdError::Config("Could not determine home directory".to_string()))?;
        Ok(Self::new(home.join(APP_DIR)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn load_api_key(&self) -> Result<Option<String>> {
        let path = self.file();
        if !path.exists() {
            return Ok(None);
        }

        let config: ConfigFile = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        Ok(config.api_key.filter(|k| !k.is_empty()))
    }

    pub fn save_api_key(&self, api_key: &str) -> Result<()> {
        if api_key.trim().is_empty() {
            return Err(FastCmdError::InvalidInput("API key cannot be empty".to_string()));
        }

        std::fs::create_dir_all(&self.dir)?;
        let config = ConfigFile {
            api_key: Some(api_key.trim().to_string()),
        };
        std::fs::write(self.file(), serde_json::to_string(&config)?)?;
        Ok(())
    }

    /// Returns whether there was a key file to remove
    pub fn clear_api_key(&self) -> Result<bool> {
        let path = self.file();
        if !path.exists() {
            return Ok(false);
        }

        std::fs::remove_file(path)?;
        Ok(true)
    }
}

/// Everything the process needs to build its collaborators
#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: PathBuf,
    /// Empty when no key is configured; embedding calls then fail
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub dimension: usize,
    pub search_mode: SearchMode,
}

impl Settings {
    /// Resolve from the process environment and `~/.fastcmd`
    pub fn load() -> Result<Self> {
        let store = ConfigStore::from_home()?;
        Self::resolve(|name| std::env::var(name).ok(), &store)
    }

    /// Resolve from an arbitrary variable lookup
    ///
    /// The environment key wins over the key file; an environment key that
    /// isn't saved yet gets saved.
    pub fn resolve<F>(lookup: F, store: &ConfigStore) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = match var(ENV_API_KEY) {
            Some(key) => {
                if store.load_api_key()?.is_none() {
                    store.save_api_key(&key)?;
                }
                key
            }
            None => store.load_api_key()?.unwrap_or_default(),
        };

        let db_dir = var(ENV_DB_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| store.dir().to_path_buf());

        let dimension = match var(ENV_DIMENSION) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|d| *d > 0)
                .ok_or_else(|| {
                    FastCmdError::Config(format!("{} must be a positive integer, got '{}'", ENV_DIMENSION, raw))
                })?,
            None => DEFAULT_DIMENSION,
        };

        let search_mode = match var(ENV_SEARCH_MODE) {
            Some(raw) => raw.parse()?,
            None => SearchMode::default(),
        };

        Ok(Self {
            db_path: db_dir.join(DB_FILE),
            api_key,
            api_base: var(ENV_API_BASE).unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            model: var(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            dimension,
            search_mode,
        })
    }
}

/// Where an export goes when no path is given
///
/// `~/Desktop/fastcmd_export_<timestamp>.json`, or the home directory itself
/// when there is no Desktop.
pub fn default_export_path(home: &Path, now: DateTime<Local>) -> PathBuf {
    let filename = format!("fastcmd_export_{}.json", now.format("%Y%m%d_%H%M%S"));
    let desktop = home.join("Desktop");
    if desktop.is_dir() {
        desktop.join(filename)
    } else {
        home.join(filename)
    }
}
