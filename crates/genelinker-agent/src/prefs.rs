//! Small JSON preference file kept in the workspace directory.
//!
//! Holds the values a user sets interactively: an API key and model that
//! fill in for missing config values, whether the guided tour was seen, and
//! recent search queries.

use std::fmt;
use std::path::{Path, PathBuf};

use genelinker_common::{write_artifact, GeneLinkerError, Result};
use genelinker_config::{Config, Credential};
use serde::{Deserialize, Serialize};

pub const MAX_RECENT_SEARCHES: usize = 10;

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
struct Preferences {
    #[serde(rename = "genelinker_api_key", default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(rename = "genelinker_model_name", default, skip_serializing_if = "Option::is_none")]
    model_name: Option<String>,
    #[serde(rename = "genelinker_tour_completed", default)]
    tour_completed: bool,
    #[serde(rename = "genelinker_recent_searches", default)]
    recent_searches: Vec<String>,
}

pub struct PreferenceStore {
    path: PathBuf,
    prefs: Preferences,
}

impl PreferenceStore {
    /// Load `path`. A missing file gives empty preferences; an unreadable
    /// one is logged and replaced on the next save.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let prefs = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt preference file");
                Preferences::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Preferences::default(),
            Err(e) => {
                return Err(GeneLinkerError::FileOperation(format!("cannot read {}: {e}", path.display())));
            }
        };
        Ok(Self { path, prefs })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.prefs)?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| GeneLinkerError::FileOperation(format!("invalid preference path {}", self.path.display())))?;
        write_artifact(dir, name, json.as_bytes())?;
        Ok(())
    }

    pub fn api_key(&self) -> Credential {
        self.prefs.api_key.as_deref().map(Credential::new).unwrap_or_default()
    }

    /// Store an API key; blank input removes it.
    pub fn set_api_key(&mut self, key: &str) {
        self.prefs.api_key = Some(key.trim().to_string()).filter(|k| !k.is_empty());
    }

    pub fn model_name(&self) -> Option<&str> {
        self.prefs.model_name.as_deref()
    }

    pub fn set_model_name(&mut self, model: &str) {
        self.prefs.model_name = Some(model.trim().to_string()).filter(|m| !m.is_empty());
    }

    /// Forget the stored key and model.
    pub fn clear_api_config(&mut self) {
        self.prefs.api_key = None;
        self.prefs.model_name = None;
    }

    pub fn tour_completed(&self) -> bool {
        self.prefs.tour_completed
    }

    pub fn set_tour_completed(&mut self, done: bool) {
        self.prefs.tour_completed = done;
    }

    /// Most recent first.
    pub fn recent_searches(&self) -> &[String] {
        &self.prefs.recent_searches
    }

    /// Move `query` to the front of the history, dropping duplicates and
    /// anything past [`MAX_RECENT_SEARCHES`]. Blank queries are ignored.
    pub fn record_search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        let recent = &mut self.prefs.recent_searches;
        recent.retain(|q| q != query);
        recent.insert(0, query.to_string());
        recent.truncate(MAX_RECENT_SEARCHES);
    }

    pub fn clear_recent_searches(&mut self) {
        self.prefs.recent_searches.clear();
    }

    /// Fill the LLM credential and model from stored values where the
    /// configuration has none of its own.
    pub fn apply_to(&self, config: &mut Config) {
        let key = self.api_key();
        if !config.llm.credential.is_usable() && key.is_usable() {
            tracing::debug!("using API key from preferences");
            config.llm.credential = key;
        }
        if let Some(model) = self.model_name() {
            config.llm.model_name = model.to_string();
        }
    }
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("path", &self.path)
            .field("api_key", &self.prefs.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model_name", &self.prefs.model_name)
            .field("tour_completed", &self.prefs.tour_completed)
            .field("recent_searches", &self.prefs.recent_searches)
            .finish()
    }
}
