//! Configuration Vault – reads/writes `~/.hearth/config.toml`.

use hearth_memory::DEFAULT_MEMORY_FILE;
use hearth_runtime::{DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Supported completion providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Ollama,
    OpenAI,
}

impl AiProvider {
    /// Parse a provider name, falling back to Ollama for anything unknown.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "openai" => AiProvider::OpenAI,
            _ => AiProvider::Ollama,
        }
    }
}

impl std::fmt::Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiProvider::Ollama => write!(f, "ollama"),
            AiProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Persisted user configuration stored in `~/.hearth/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Chosen completion provider.
    #[serde(default)]
    pub ai_provider: AiProvider,

    /// Active model name (e.g. "llama3", "gpt-4o-mini").
    #[serde(default = "default_model")]
    pub active_model: String,

    /// Base URL of the Ollama instance.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Base URL of the OpenAI-compatible cloud API.
    #[serde(default = "default_openai_url")]
    pub openai_url: String,

    /// OpenAI API key (plain text; the file is written owner-only).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub openai_api_key: String,

    /// Where remembered facts are stored.
    #[serde(default = "default_memory_path")]
    pub memory_path: PathBuf,

    /// Sampling temperature for every completion.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Persona instruction sent as the system message.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("ai_provider", &self.ai_provider)
            .field("active_model", &self.active_model)
            .field("ollama_url", &self.ollama_url)
            .field("openai_url", &self.openai_url)
            .field(
                "openai_api_key",
                if self.openai_api_key.is_empty() { &"<not set>" } else { &"<redacted>" },
            )
            .field("memory_path", &self.memory_path)
            .field("temperature", &self.temperature)
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}

fn default_model() -> String {
    "llama3".to_string()
}
fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_openai_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_memory_path() -> PathBuf {
    PathBuf::from(DEFAULT_MEMORY_FILE)
}
fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

/// Model suggested when the wizard switches to OpenAI.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

impl Default for Config {
    fn default() -> Self {
        Self {
            ai_provider: AiProvider::default(),
            active_model: default_model(),
            ollama_url: default_ollama_url(),
            openai_url: default_openai_url(),
            openai_api_key: String::new(),
            memory_path: default_memory_path(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl Config {
    /// Base URL of the completion endpoint for the chosen provider.
    pub fn llm_base_url(&self) -> &str {
        match self.ai_provider {
            AiProvider::Ollama => &self.ollama_url,
            AiProvider::OpenAI => &self.openai_url,
        }
    }
}

/// Return the path to `~/.hearth/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".hearth").join("config.toml")
}

/// Load the config from disk with environment overrides applied.
/// Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    let mut cfg = load_from(&config_path())?;
    if let Some(cfg) = cfg.as_mut() {
        apply_env_overrides(cfg);
    }
    Ok(cfg)
}

/// Load the config exactly as stored at `path`.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `HEARTH_OLLAMA_URL` | `ollama_url` |
/// | `HEARTH_MODEL` | `active_model` |
/// | `HEARTH_MEMORY_PATH` | `memory_path` |
/// | `HEARTH_TEMPERATURE` | `temperature` |
/// | `OPENAI_API_KEY` | `openai_api_key` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("HEARTH_OLLAMA_URL") {
        cfg.ollama_url = v;
    }
    if let Ok(v) = std::env::var("HEARTH_MODEL") {
        cfg.active_model = v;
    }
    if let Ok(v) = std::env::var("HEARTH_MEMORY_PATH") {
        cfg.memory_path = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("HEARTH_TEMPERATURE")
        && let Ok(t) = v.parse::<f32>()
        && (0.0..=2.0).contains(&t)
    {
        cfg.temperature = t;
    }
    if let Ok(v) = std::env::var("OPENAI_API_KEY")
        && !v.is_empty()
    {
        cfg.openai_api_key = v;
    }
}

/// Save the config to disk, creating `~/.hearth/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    // The file may hold an API key: owner read/write only on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
