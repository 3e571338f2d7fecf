//! Alias management
//!
//! Aliases are named references to record storage endpoints, including the
//! URL and the API token. They are persisted as TOML in the user's config
//! directory and loaded once per CLI invocation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// A named reference to a storage service endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub url: String,
    pub token: String,
}

impl Alias {
    pub fn new(name: &str, url: &str, token: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            token: token.to_string(),
        }
    }
}

/// On-disk representation of one alias; the name is the map key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AliasEntry {
    url: String,
    token: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    aliases: BTreeMap<String, AliasEntry>,
}

/// Loads and persists the alias store.
///
/// The config file lives at `<config-dir>/rstore/config.toml`, where the
/// config dir is resolved from (in order): an explicit path, the
/// `RSTORE_CONFIG_DIR` environment variable, or the platform config
/// directory.
#[derive(Debug)]
pub struct AliasManager {
    path: PathBuf,
}

impl AliasManager {
    pub fn new() -> Result<Self> {
        if let Ok(dir) = std::env::var("RSTORE_CONFIG_DIR") {
            return Ok(Self::with_config_dir(Path::new(&dir)));
        }

        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        Ok(Self::with_config_dir(&dir.join("rstore")))
    }

    pub fn with_config_dir(dir: &Path) -> Self {
        Self {
            path: dir.join("config.toml"),
        }
    }

    /// Add a new alias. Fails if the name is already taken.
    pub fn add(&self, alias: Alias) -> Result<()> {
        Url::parse(&alias.url).map_err(|_| Error::Parse(alias.url.clone()))?;

        let mut config = self.load()?;
        if config.aliases.contains_key(&alias.name) {
            return Err(Error::AliasExists(alias.name));
        }

        config.aliases.insert(
            alias.name,
            AliasEntry {
                url: alias.url,
                token: alias.token,
            },
        );
        self.save(&config)
    }

    /// Look up one alias by name.
    pub fn get(&self, name: &str) -> Result<Alias> {
        let config = self.load()?;
        config
            .aliases
            .get(name)
            .map(|entry| Alias::new(name, &entry.url, &entry.token))
            .ok_or_else(|| Error::AliasNotFound(name.to_string()))
    }

    /// List all aliases, sorted by name.
    pub fn list(&self) -> Result<Vec<Alias>> {
        let config = self.load()?;
        Ok(config
            .aliases
            .iter()
            .map(|(name, entry)| Alias::new(name, &entry.url, &entry.token))
            .collect())
    }

    /// Remove an alias. Fails if it does not exist.
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.load()?;
        if config.aliases.remove(name).is_none() {
            return Err(Error::AliasNotFound(name.to_string()));
        }
        self.save(&config)
    }

    fn load(&self) -> Result<ConfigFile> {
        if !self.path.exists() {
            return Ok(ConfigFile::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", self.path.display())))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", self.path.display())))
    }

    fn save(&self, config: &ConfigFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config dir: {e}")))?;
        }

        let content = toml::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&self.path, content)
            .map_err(|e| Error::Config(format!("Failed to write {}: {e}", self.path.display())))
    }
}
