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

use std::sync::Arc;

use tracing::{debug, warn};

use super::prompts::PromptPack;
use crate::completion::{CompletionProvider, CompletionRequest};
use crate::config::AnsweringConfig;

/// Text produced for one chunk
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub text: String,
    pub is_valid: bool,
}

/// Answers a question from a single chunk and classifies the result
pub struct ChunkAnswerer {
    provider: Arc<dyn CompletionProvider>,
    prompts: Arc<PromptPack>,
    max_tokens: u32,
    temperature: f32,
}

impl ChunkAnswerer {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        prompts: Arc<PromptPack>,
        config: &AnsweringConfig,
    ) -> Self {
        Self {
            provider,
            prompts,
            max_tokens: config.chunk_max_tokens,
            temperature: config.temperature,
        }
    }

    /// Never fails: a provider error becomes an invalid outcome carrying the
    /// error text
    pub async fn answer(&self, question: &str, chunk: &str) -> AnswerOutcome {
        let request = CompletionRequest {
            system: self.prompts.chunk_system.clone(),
            prompt: self.prompts.chunk_prompt(question, chunk),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        match self.provider.complete(&request).await {
            Ok(text) => {
                let text = text.trim().to_string();
                let is_valid = self.is_valid(&text);
                debug!(
                    chunk_len = chunk.len(),
                    answer_len = text.len(),
                    is_valid,
                    "Chunk answered"
                );
                AnswerOutcome { text, is_valid }
            }
            Err(err) => {
                warn!(error = %err, "Chunk completion failed");
                AnswerOutcome {
                    text: self.prompts.chunk_error(&err.to_string()),
                    is_valid: false,
                }
            }
        }
    }

    /// Blank text and text containing a marker phrase are not answers
    pub fn is_valid(&self, text: &str) -> bool {
        !text.trim().is_empty() && !self.prompts.is_no_information(text)
    }
}
