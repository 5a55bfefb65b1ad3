// Copyright 2026 Muvon Un Limited
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

//! Text completion capability.
//!
//! The answering pipeline only sees [`CompletionProvider`]: one async method
//! taking a system instruction, a user prompt, an output bound and a sampling
//! temperature. Concrete backends live in submodules and are built from
//! [`CompletionConfig`] by [`create_completion_provider`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::CompletionConfig;

pub mod guarded;
pub mod openai;
#[cfg(test)]
pub mod stub;

pub use guarded::GuardedCompletion;
pub use openai::OpenAiProvider;

/// One completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Failure of a single completion call
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("unsupported completion provider: {0}")]
    UnsupportedProvider(String),

    #[error("API key environment variable {env} is not set")]
    MissingApiKey { env: String },

    #[error("invalid completion endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {snippet}")]
    HttpStatus { status: u16, snippet: String },

    #[error("failed to decode provider response: {0}")]
    Decode(String),

    #[error("provider returned no choices")]
    EmptyChoices,

    #[error("completion timed out after {0:?}")]
    Timeout(Duration),
}

impl CompletionError {
    /// Failures worth another attempt: network trouble, timeouts, throttling
    /// and server-side errors
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate text for `request`. The returned text is trimmed.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// Build the configured provider wrapped with timeout and retry handling
pub fn create_completion_provider(
    config: &CompletionConfig,
) -> Result<Arc<dyn CompletionProvider>, CompletionError> {
    let inner: Arc<dyn CompletionProvider> = match config.provider.to_lowercase().as_str() {
        "openai" => Arc::new(OpenAiProvider::from_config(config)?),
        other => return Err(CompletionError::UnsupportedProvider(other.to_string())),
    };

    Ok(Arc::new(GuardedCompletion::from_config(inner, config)))
}
