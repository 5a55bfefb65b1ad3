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

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A pre-split segment of a patent document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentChunk {
    #[serde(default)]
    pub text: String,
    /// Any other fields the ingestion step attached (section, offsets, ...)
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl ContentChunk {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Body of one corpus entry, keyed by application number in the source file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatentBody {
    #[serde(default)]
    pub patent_summary: String,
    #[serde(default)]
    pub content_chunks: Vec<ContentChunk>,
}

/// A patent loaded into the corpus index
#[derive(Debug, Clone)]
pub struct PatentRecord {
    pub id: String,
    pub summary: String,
    pub chunks: Vec<ContentChunk>,
}

impl PatentRecord {
    pub fn from_body(id: String, body: PatentBody) -> Self {
        Self {
            id,
            summary: body.patent_summary,
            chunks: body.content_chunks,
        }
    }

    /// Chunk texts that are worth sending to the completion provider
    pub fn answerable_chunks(&self) -> impl Iterator<Item = &str> {
        self.chunks
            .iter()
            .filter(|c| !c.is_blank())
            .map(|c| c.text.as_str())
    }
}

/// A patent selected by the ranker for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub patent_id: String,
    pub score: f64,
    /// Position of the patent in corpus load order
    pub corpus_index: usize,
}

/// Corpus statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_patents: usize,
    pub total_chunks: usize,
    pub answerable_chunks: usize,
    pub empty_summaries: usize,
    pub vocabulary_size: usize,
    pub fingerprint: String,
}
