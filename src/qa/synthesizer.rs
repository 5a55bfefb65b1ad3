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

use tracing::{debug, error};

use super::prompts::PromptPack;
use super::types::PatentAnswers;
use crate::completion::{CompletionProvider, CompletionRequest};
use crate::config::AnsweringConfig;

/// Merges valid chunk answers from all consulted patents into one answer.
///
/// The merge context is the bare answer texts: patent identifiers never reach
/// the prompt, so they cannot be echoed into the prose. Citations travel in
/// the query result instead.
pub struct MultiDocumentSynthesizer {
    provider: Arc<dyn CompletionProvider>,
    prompts: Arc<PromptPack>,
    max_tokens: u32,
    temperature: f32,
}

impl MultiDocumentSynthesizer {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        prompts: Arc<PromptPack>,
        config: &AnsweringConfig,
    ) -> Self {
        Self {
            provider,
            prompts,
            max_tokens: config.synthesis_max_tokens,
            temperature: config.temperature,
        }
    }

    /// Never fails: without answers the fixed no-information answer is
    /// returned without calling the provider, and a provider error becomes
    /// an explanatory answer.
    pub async fn synthesize(&self, question: &str, per_patent: &[PatentAnswers]) -> String {
        let answers: Vec<&str> = per_patent
            .iter()
            .flat_map(|patent| patent.answer_texts())
            .collect();

        if answers.is_empty() {
            debug!("No valid answers to synthesize");
            return self.prompts.no_information_answer.clone();
        }

        let combined = answers.join("\n\n");
        let request = CompletionRequest {
            system: self.prompts.synthesis_system.clone(),
            prompt: self.prompts.synthesis_prompt(question, &combined),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(
            answers = answers.len(),
            patents = per_patent.iter().filter(|p| p.has_answers()).count(),
            context_len = combined.len(),
            "Synthesizing answer"
        );

        match self.provider.complete(&request).await {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                error!(error = %err, "Answer synthesis failed");
                self.prompts.synthesis_error(&err.to_string())
            }
        }
    }
}
