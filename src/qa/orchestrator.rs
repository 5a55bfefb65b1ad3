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

use anyhow::Result;
use chrono::Utc;
use tracing::{info, info_span, Instrument};

use super::answerer::ChunkAnswerer;
use super::collector::PatentAnswerCollector;
use super::prompts::PromptPack;
use super::synthesizer::MultiDocumentSynthesizer;
use super::types::{PatentAnswers, QueryResult};
use crate::completion::CompletionProvider;
use crate::config::Config;
use crate::corpus::{CorpusIndex, RankedCandidate};

/// Question in, query result out.
///
/// Holds nothing mutable: the corpus index is shared read-only, so one
/// orchestrator can serve concurrent questions.
pub struct QueryOrchestrator {
    index: Arc<CorpusIndex>,
    collector: PatentAnswerCollector,
    synthesizer: MultiDocumentSynthesizer,
    prompts: Arc<PromptPack>,
    default_max_patents: usize,
}

impl QueryOrchestrator {
    pub fn new(
        index: Arc<CorpusIndex>,
        provider: Arc<dyn CompletionProvider>,
        config: &Config,
    ) -> Result<Self> {
        let prompts = Arc::new(PromptPack::from_config(&config.prompts)?);
        let answerer = ChunkAnswerer::new(provider.clone(), prompts.clone(), &config.answering);
        let collector = PatentAnswerCollector::new(
            index.clone(),
            answerer,
            config.answering.chunk_concurrency,
        );
        let synthesizer =
            MultiDocumentSynthesizer::new(provider, prompts.clone(), &config.answering);

        Ok(Self {
            index,
            collector,
            synthesizer,
            prompts,
            default_max_patents: config.retrieval.max_patents,
        })
    }

    pub fn index(&self) -> &CorpusIndex {
        &self.index
    }

    pub fn default_max_patents(&self) -> usize {
        self.default_max_patents
    }

    pub fn rank(&self, question: &str, limit: usize) -> Vec<RankedCandidate> {
        self.index.rank(question, limit)
    }

    /// Answer one question from at most `max_patents` ranked patents
    pub async fn ask(&self, question: &str, max_patents: usize) -> QueryResult {
        let span = info_span!("ask", max_patents);
        self.ask_inner(question, max_patents).instrument(span).await
    }

    async fn ask_inner(&self, question: &str, max_patents: usize) -> QueryResult {
        let candidates = self.index.rank(question, max_patents);

        if candidates.is_empty() {
            info!("No relevant patents for question");
            return QueryResult::no_documents(question, &self.prompts.no_documents_answer);
        }

        info!(
            candidates = candidates.len(),
            top_score = candidates[0].score,
            "Relevant patents found"
        );

        let mut per_patent: Vec<PatentAnswers> = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            let collected = self.collector.collect(question, &candidate.patent_id).await;
            info!(
                patent_id = %candidate.patent_id,
                score = candidate.score,
                chunks_reviewed = collected.chunks_reviewed,
                valid_answers = collected.answers.len(),
                "Patent reviewed"
            );
            per_patent.push(collected);
        }

        let total_chunks_reviewed: usize = per_patent.iter().map(|p| p.chunks_reviewed).sum();
        let total_valid_answers: usize = per_patent.iter().map(|p| p.answers.len()).sum();
        info!(
            total_chunks_reviewed,
            total_valid_answers,
            "Synthesizing final answer"
        );

        let answer = self.synthesizer.synthesize(question, &per_patent).await;

        QueryResult {
            question: question.to_string(),
            answer,
            application_numbers: candidates.iter().map(|c| c.patent_id.clone()).collect(),
            similarity_scores: candidates.iter().map(|c| c.score).collect(),
            patents_with_answers: per_patent
                .iter()
                .filter(|p| p.has_answers())
                .map(|p| p.patent_id.clone())
                .collect(),
            total_chunks_reviewed,
            total_valid_answers,
            timestamp: Utc::now(),
        }
    }

    /// Answer each question independently, results in input order
    pub async fn batch(&self, questions: &[String], max_patents: usize) -> Vec<QueryResult> {
        let mut results = Vec::with_capacity(questions.len());
        for (i, question) in questions.iter().enumerate() {
            info!(
                position = i + 1,
                total = questions.len(),
                "Processing batch question"
            );
            let result = self.ask(question, max_patents).await;
            info!(
                position = i + 1,
                patents_with_answers = result.patents_with_answers.len(),
                "Batch question done"
            );
            results.push(result);
        }
        results
    }
}
