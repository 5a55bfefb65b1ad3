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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generated text for one chunk and whether it counts as a grounded answer
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkAnswer {
    pub patent_id: String,
    /// Position of the chunk within its patent
    pub chunk_index: usize,
    pub chunk_text: String,
    pub answer: String,
    pub is_valid: bool,
}

/// Result of scanning every chunk of one patent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatentAnswers {
    pub patent_id: String,
    /// Non-blank chunks sent to the completion provider
    pub chunks_reviewed: usize,
    /// Valid answers only, in chunk order
    pub answers: Vec<ChunkAnswer>,
}

impl PatentAnswers {
    pub fn answer_texts(&self) -> impl Iterator<Item = &str> {
        self.answers.iter().map(|a| a.answer.as_str())
    }

    pub fn has_answers(&self) -> bool {
        !self.answers.is_empty()
    }
}

/// Response payload for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub question: String,
    pub answer: String,
    /// Ranked candidates considered, best first
    pub application_numbers: Vec<String>,
    /// Parallel to `application_numbers`
    pub similarity_scores: Vec<f64>,
    pub patents_with_answers: Vec<String>,
    pub total_chunks_reviewed: usize,
    pub total_valid_answers: usize,
    pub timestamp: DateTime<Utc>,
}

impl QueryResult {
    /// Result for a question no patent is relevant to
    pub fn no_documents(question: &str, answer: &str) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            application_numbers: Vec::new(),
            similarity_scores: Vec::new(),
            patents_with_answers: Vec::new(),
            total_chunks_reviewed: 0,
            total_valid_answers: 0,
            timestamp: Utc::now(),
        }
    }

    pub fn has_answers(&self) -> bool {
        self.total_valid_answers > 0
    }
}
