//! Configuration loading for GeneLinker.
//! Reads genelinker.toml from the current directory or the path in GENELINKER_CONFIG,
//! then applies environment overrides. Credentials never live in source.

use genelinker_common::Persona;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for genelinker_common::GeneLinkerError {
    fn from(e: ConfigError) -> Self {
        genelinker_common::GeneLinkerError::Config(e.to_string())
    }
}

// ── Credential ────────────────────────────────────────────────────────────────

/// An API credential. Redacted in `Debug`; placeholder values count as absent.
#[derive(Clone, Default)]
pub struct Credential(Option<SecretString>);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            return Self(None);
        }
        Self(Some(SecretString::from(value.trim())))
    }

    pub fn none() -> Self {
        Self(None)
    }

    /// True when a real (non-placeholder) credential is present.
    pub fn is_usable(&self) -> bool {
        self.expose().is_some()
    }

    /// The secret, or `None` when missing or a placeholder.
    pub fn expose(&self) -> Option<&str> {
        self.0
            .as_ref()
            .map(|s| s.expose_secret())
            .filter(|s| !is_placeholder(s))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(_) => f.write_str("Credential([REDACTED])"),
            None    => f.write_str("Credential(None)"),
        }
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(Credential::new).unwrap_or_default())
    }
}

/// Recognizes values copied from example configs rather than real keys.
pub fn is_placeholder(value: &str) -> bool {
    let v = value.trim().to_ascii_lowercase();
    v.is_empty()
        || v == "changeme"
        || v == "sk-..."
        || v == "xxx"
        || (v.starts_with('<') && v.ends_with('>'))
        || (v.contains("your") && v.contains("key"))
}

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub literature: LiteratureConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub mindmap: MindMapConfig,
}

/// Chat-completion provider. Any OpenAI-compatible endpoint works
/// (OpenAI, Groq, OpenRouter, a local server).
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub credential: Credential,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default)]
    pub persona: Persona,
}

fn default_llm_endpoint() -> String { "https://api.openai.com/v1".to_string() }
fn default_model_name()   -> String { "gpt-4".to_string() }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            credential: Credential::none(),
            model_name: default_model_name(),
            persona: Persona::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiteratureConfig {
    #[serde(default = "default_literature_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub credential: Credential,
    #[serde(default = "default_result_limit")]
    pub default_limit: usize,
}

fn default_literature_endpoint() -> String { "https://api.core.ac.uk/v3".to_string() }
fn default_result_limit()        -> usize  { 10 }

impl Default for LiteratureConfig {
    fn default() -> Self {
        Self {
            endpoint: default_literature_endpoint(),
            credential: Credential::none(),
            default_limit: default_result_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub extra_allowed_domains: Vec<String>,
}

fn default_timeout_secs() -> u64 { 15 }

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: default_timeout_secs(), extra_allowed_domains: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_workspace_path")]
    pub path: PathBuf,
    #[serde(default = "default_exports_dir")]
    pub exports_dir: String,
}

fn default_workspace_path() -> PathBuf { PathBuf::from("./workspace") }
fn default_exports_dir()    -> String  { "exports".to_string() }

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self { path: default_workspace_path(), exports_dir: default_exports_dir() }
    }
}

impl WorkspaceConfig {
    pub fn exports_path(&self) -> PathBuf {
        self.path.join(&self.exports_dir)
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.path.join("preferences.json")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MindMapConfig {
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,
    /// Output width of PNG exports; height follows the aspect ratio.
    #[serde(default)]
    pub png_width: Option<u32>,
}

fn default_canvas_width()  -> u32 { 800 }
fn default_canvas_height() -> u32 { 600 }

impl Default for MindMapConfig {
    fn default() -> Self {
        Self {
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            png_width: None,
        }
    }
}


// ── Loading ───────────────────────────────────────────────────────────────────

pub const CONFIG_ENV: &str = "GENELINKER_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "genelinker.toml";

impl Config {
    /// Path of the config file: GENELINKER_CONFIG or ./genelinker.toml.
    pub fn resolve_path() -> PathBuf {
        std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration, falling back to built-in defaults when the file
    /// does not exist, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::resolve_path();
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply overrides from the environment. `lookup` is injectable for tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("GENELINKER_LLM_API_KEY") {
            self.llm.credential = Credential::new(key);
        }
        if let Some(model) = lookup("GENELINKER_LLM_MODEL").filter(|m| !m.trim().is_empty()) {
            self.llm.model_name = model.trim().to_string();
        }
        if let Some(endpoint) = lookup("GENELINKER_LLM_ENDPOINT").filter(|e| !e.trim().is_empty()) {
            self.llm.endpoint = endpoint.trim().to_string();
        }
        if let Some(key) = lookup("GENELINKER_LITERATURE_API_KEY") {
            self.literature.credential = Credential::new(key);
        }
        if let Some(endpoint) = lookup("GENELINKER_LITERATURE_ENDPOINT").filter(|e| !e.trim().is_empty()) {
            self.literature.endpoint = endpoint.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, endpoint) in [("llm.endpoint", &self.llm.endpoint), ("literature.endpoint", &self.literature.endpoint)] {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!("{name} must be an http(s) URL, got '{endpoint}'")));
            }
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid("http.timeout_secs must be greater than zero".to_string()));
        }
        if !(1..=100).contains(&self.literature.default_limit) {
            return Err(ConfigError::Invalid(format!(
                "literature.default_limit must be between 1 and 100, got {}",
                self.literature.default_limit
            )));
        }
        if self.mindmap.canvas_width == 0 || self.mindmap.canvas_height == 0 {
            return Err(ConfigError::Invalid("mindmap canvas dimensions must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http.timeout_secs)
    }
}
