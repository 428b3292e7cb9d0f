//! JSON configuration
//!
//! Loaded from a single file (default `config.json`). A missing file falls
//! back to defaults with a warning; a file that exists but does not parse
//! is an error, so a typo never silently reverts the run to defaults.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub review: ReviewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "qwen2.5-coder:7b".to_string(),
            base_url: "http://localhost:11434".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default = "default_prompt_variant")]
    pub prompt_variant: String,
    /// Upper bound on model turns per file conversation.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    /// Context lines captured around each usage site.
    #[serde(default = "default_usage_context_lines")]
    pub usage_context_lines: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            prompt_variant: default_prompt_variant(),
            max_turns: default_max_turns(),
            usage_context_lines: default_usage_context_lines(),
        }
    }
}

fn default_prompt_variant() -> String {
    "default".to_string()
}

fn default_max_turns() -> usize {
    10
}

fn default_usage_context_lines() -> usize {
    3
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        if !path.exists() {
            eprintln!(
                "warning: config file {} not found, using defaults",
                path.display()
            );
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}
