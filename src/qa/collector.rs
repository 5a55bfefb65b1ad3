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

use futures::stream::{self, StreamExt};
use tracing::{debug, trace, warn};

use super::answerer::ChunkAnswerer;
use super::types::{ChunkAnswer, PatentAnswers};
use crate::corpus::CorpusIndex;

/// Runs the chunk answerer over every chunk of a patent.
///
/// The scan is exhaustive: a valid answer never stops later chunks from
/// being asked. Up to `concurrency` chunks are in flight at once, and
/// outcomes are kept in chunk order whatever order they finish in.
pub struct PatentAnswerCollector {
    index: Arc<CorpusIndex>,
    answerer: ChunkAnswerer,
    concurrency: usize,
}

impl PatentAnswerCollector {
    pub fn new(index: Arc<CorpusIndex>, answerer: ChunkAnswerer, concurrency: usize) -> Self {
        Self {
            index,
            answerer,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn collect(&self, question: &str, patent_id: &str) -> PatentAnswers {
        let Some(record) = self.index.get(patent_id) else {
            warn!(patent_id, "Patent not present in corpus");
            return PatentAnswers {
                patent_id: patent_id.to_string(),
                ..PatentAnswers::default()
            };
        };

        let chunks: Vec<(usize, &str)> = record
            .chunks
            .iter()
            .enumerate()
            .filter(|(_, chunk)| !chunk.is_blank())
            .map(|(idx, chunk)| (idx, chunk.text.as_str()))
            .collect();
        let chunks_reviewed = chunks.len();

        let outcomes: Vec<ChunkAnswer> = stream::iter(chunks)
            .map(|(chunk_index, text)| async move {
                let outcome = self.answerer.answer(question, text).await;
                ChunkAnswer {
                    patent_id: patent_id.to_string(),
                    chunk_index,
                    chunk_text: text.to_string(),
                    answer: outcome.text,
                    is_valid: outcome.is_valid,
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let answers: Vec<ChunkAnswer> = outcomes.into_iter().filter(|a| a.is_valid).collect();
        for answer in &answers {
            trace!(
                patent_id = %answer.patent_id,
                chunk_index = answer.chunk_index,
                chunk_len = answer.chunk_text.len(),
                "Valid chunk answer"
            );
        }

        debug!(
            patent_id,
            chunks_reviewed,
            valid_answers = answers.len(),
            "Patent chunks reviewed"
        );

        PatentAnswers {
            patent_id: patent_id.to_string(),
            chunks_reviewed,
            answers,
        }
    }
}
