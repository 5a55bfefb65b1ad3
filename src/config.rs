// Copyright 2025 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_TEMPLATE: &str = include_str!("../config-templates/default.toml");

/// Where the chunked corpus lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub path: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("final_patent_chunking_results.json"),
        }
    }
}

/// Summary feature space and ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub max_features: usize,
    pub ngram_min: usize,
    pub ngram_max: usize,
    pub min_df: usize,
    /// Default number of patents consulted per question
    pub max_patents: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_features: 10_000,
            ngram_min: 1,
            ngram_max: 2,
            min_df: 1,
            max_patents: 3,
        }
    }
}

/// Completion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
    /// Extra attempts after a failed call. 0 accepts the first failure as final.
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            endpoint: "https://api.openai.com".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
            max_retries: 0,
            retry_backoff_ms: 500,
        }
    }
}

/// Generation limits for chunk answers and synthesis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnsweringConfig {
    pub chunk_max_tokens: u32,
    pub synthesis_max_tokens: u32,
    pub temperature: f32,
    /// Chunks of one patent answered in parallel
    pub chunk_concurrency: usize,
}

impl Default for AnsweringConfig {
    fn default() -> Self {
        Self {
            chunk_max_tokens: 400,
            synthesis_max_tokens: 1500,
            temperature: 0.3,
            chunk_concurrency: 4,
        }
    }
}

/// Prompt pack selection. Any field left out falls back to the built-in
/// pack of `locale`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub locale: Option<String>,
    pub chunk_system: Option<String>,
    pub chunk_template: Option<String>,
    pub synthesis_system: Option<String>,
    pub synthesis_template: Option<String>,
    pub marker_phrases: Option<Vec<String>>,
    pub no_documents_answer: Option<String>,
    pub no_information_answer: Option<String>,
    pub chunk_error_template: Option<String>,
    pub synthesis_error_template: Option<String>,
}

/// Main configuration for patent-qa
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub answering: AnsweringConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
}

impl Config {
    /// Load configuration.
    /// An explicit path must exist. Otherwise the system config file is used,
    /// created from the embedded template on first run.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let config_path = crate::storage::get_system_config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::parse(DEFAULT_TEMPLATE)?;

            if let Some(parent) = config_path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&config_path, DEFAULT_TEMPLATE).with_context(|| {
                format!("Failed to write default config to {}", config_path.display())
            })?;

            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let retrieval = &self.retrieval;
        if retrieval.max_features == 0 {
            anyhow::bail!("retrieval.max_features must be greater than 0");
        }
        if retrieval.ngram_min == 0 || retrieval.ngram_min > retrieval.ngram_max {
            anyhow::bail!(
                "retrieval n-gram range must satisfy 1 <= ngram_min <= ngram_max, got {}..{}",
                retrieval.ngram_min,
                retrieval.ngram_max
            );
        }
        if retrieval.min_df == 0 {
            anyhow::bail!("retrieval.min_df must be at least 1");
        }
        if self.answering.chunk_concurrency == 0 {
            anyhow::bail!("answering.chunk_concurrency must be at least 1");
        }
        if !(0.0..=2.0).contains(&self.answering.temperature) {
            anyhow::bail!(
                "answering.temperature must be within 0.0..=2.0, got {}",
                self.answering.temperature
            );
        }
        if self.completion.timeout_secs == 0 {
            anyhow::bail!("completion.timeout_secs must be greater than 0");
        }
        crate::qa::prompts::PromptPack::from_config(&self.prompts)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_parses() {
        let config = Config::parse(DEFAULT_TEMPLATE).unwrap();
        assert_eq!(config.retrieval.max_features, 10_000);
        assert_eq!(config.retrieval.max_patents, 3);
        assert_eq!(config.answering.chunk_max_tokens, 400);
        assert_eq!(config.answering.synthesis_max_tokens, 1500);
        assert_eq!(config.completion.model, "gpt-4o-mini");
        assert_eq!(config.completion.max_retries, 0);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = Config::parse("[corpus]\npath = \"data.json\"\n").unwrap();
        assert_eq!(config.corpus.path, PathBuf::from("data.json"));
        assert_eq!(config.retrieval.ngram_max, 2);
        assert!((config.answering.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rejects_inverted_ngram_range() {
        let err = Config::parse("[retrieval]\nngram_min = 3\nngram_max = 1\n").unwrap_err();
        assert!(err.to_string().contains("n-gram"));
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        assert!(Config::parse("[answering]\nchunk_concurrency = 0\n").is_err());
    }

    #[test]
    fn test_rejects_unknown_locale() {
        assert!(Config::parse("[prompts]\nlocale = \"xx\"\n").is_err());
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[prompts]\nlocale = \"en\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.prompts.locale.as_deref(), Some("en"));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
