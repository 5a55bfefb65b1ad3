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

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::error::DataLoadError;
use super::ranking::rank_vectors;
use super::types::{CorpusStats, PatentBody, PatentRecord, RankedCandidate};
use super::vectorizer::{SparseVector, TfidfVectorizer, VectorizerParams};

/// Read-only patent corpus with a TF-IDF space over the summaries.
///
/// `records[i]` and `summary_vectors[i]` always describe the same patent;
/// positions follow the order of the source document.
pub struct CorpusIndex {
    records: Vec<PatentRecord>,
    positions: HashMap<String, usize>,
    vectorizer: TfidfVectorizer,
    summary_vectors: Vec<SparseVector>,
    fingerprint: String,
}

impl CorpusIndex {
    /// Load the chunked corpus JSON and build the feature space
    pub fn load(path: &Path, params: VectorizerParams) -> Result<Self, DataLoadError> {
        let bytes = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                DataLoadError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                DataLoadError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let records = Self::parse(path, &bytes)?;
        let fingerprint = hex::encode(Sha256::digest(&bytes));

        info!(
            path = %path.display(),
            patents = records.len(),
            "Corpus file loaded"
        );

        Ok(Self::build(records, params, fingerprint))
    }

    /// Build an index from records already in memory
    #[cfg(test)]
    pub fn from_records(records: Vec<PatentRecord>, params: VectorizerParams) -> Self {
        let mut hasher = Sha256::new();
        for record in &records {
            hasher.update(record.id.as_bytes());
            hasher.update([0u8]);
            hasher.update(record.summary.as_bytes());
            hasher.update([0u8]);
        }
        let fingerprint = hex::encode(hasher.finalize());
        Self::build(records, params, fingerprint)
    }

    fn parse(path: &Path, bytes: &[u8]) -> Result<Vec<PatentRecord>, DataLoadError> {
        let root: Value = serde_json::from_slice(bytes).map_err(|source| DataLoadError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

        let Value::Object(entries) = root else {
            return Err(DataLoadError::InvalidShape {
                path: path.to_path_buf(),
                message: "top-level value must be an object keyed by application number"
                    .to_string(),
            });
        };

        entries
            .into_iter()
            .map(|(id, value)| {
                let body: PatentBody =
                    serde_json::from_value(value).map_err(|source| DataLoadError::Malformed {
                        path: path.to_path_buf(),
                        source,
                    })?;
                Ok(PatentRecord::from_body(id, body))
            })
            .collect()
    }

    fn build(records: Vec<PatentRecord>, params: VectorizerParams, fingerprint: String) -> Self {
        let summaries: Vec<&str> = records.iter().map(|r| r.summary.as_str()).collect();
        let (vectorizer, summary_vectors) = TfidfVectorizer::fit_transform(&summaries, params);

        let positions = records
            .iter()
            .enumerate()
            .map(|(idx, record)| (record.id.clone(), idx))
            .collect();

        debug!(
            patents = records.len(),
            vocabulary = vectorizer.vocabulary_size(),
            "Summary feature space built"
        );

        Self {
            records,
            positions,
            vectorizer,
            summary_vectors,
            fingerprint,
        }
    }

    /// Top `k` patents whose summary has positive similarity to `question`
    pub fn rank(&self, question: &str, k: usize) -> Vec<RankedCandidate> {
        let query = self.vectorizer.transform(question);
        if query.is_empty() {
            debug!("Question shares no terms with the corpus vocabulary");
            return Vec::new();
        }

        rank_vectors(&query, &self.summary_vectors, k)
            .into_iter()
            .map(|(idx, score)| RankedCandidate {
                patent_id: self.records[idx].id.clone(),
                score,
                corpus_index: idx,
            })
            .collect()
    }

    pub fn get(&self, patent_id: &str) -> Option<&PatentRecord> {
        self.positions.get(patent_id).map(|&idx| &self.records[idx])
    }

    pub fn records(&self) -> &[PatentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn stats(&self) -> CorpusStats {
        let records = self.records();
        CorpusStats {
            total_patents: records.len(),
            total_chunks: records.iter().map(|r| r.chunks.len()).sum(),
            answerable_chunks: records
                .iter()
                .map(|r| r.answerable_chunks().count())
                .sum(),
            empty_summaries: records
                .iter()
                .filter(|r| r.summary.trim().is_empty())
                .count(),
            vocabulary_size: self.vectorizer.vocabulary_size(),
            fingerprint: self.fingerprint.clone(),
        }
    }
}
