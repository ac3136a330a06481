//! Ollama discovery helpers.
//!
//! Pings the configured Ollama instance and, if it answers, lists the locally
//! downloaded models from `/api/tags`.

use std::time::Duration;

use serde::Deserialize;

/// How long a probe may take before Ollama is reported offline.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// A single model entry returned by Ollama's `/api/tags` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaModel {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<OllamaModel>,
}

fn tags_url(base_url: &str) -> String {
    format!("{}/api/tags", base_url.trim_end_matches('/'))
}

/// Return the models available on the Ollama server at `base_url`.
///
/// `Err(reason)` when the server is offline or answers with something
/// unexpected.
pub fn fetch_models(base_url: &str) -> Result<Vec<OllamaModel>, String> {
    let url = tags_url(base_url);
    let client = reqwest::blocking::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

    let response = client
        .get(&url)
        .send()
        .map_err(|e| format!("Ollama unreachable at {}: {}", url, e))?;

    if !response.status().is_success() {
        return Err(format!("Ollama returned HTTP {}", response.status()));
    }

    let tags: TagsResponse = response
        .json()
        .map_err(|e| format!("Failed to parse Ollama response: {}", e))?;

    Ok(tags.models)
}

/// Returns `true` if `model` is among `models`, accepting Ollama's implicit
/// `:latest` tag (`"llama3"` matches `"llama3:latest"`).
pub fn has_model(models: &[OllamaModel], model: &str) -> bool {
    models
        .iter()
        .any(|m| m.name == model || m.name.strip_suffix(":latest") == Some(model))
}
