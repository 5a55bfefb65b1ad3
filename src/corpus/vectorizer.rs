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

//! TF-IDF feature space over patent summaries.
//!
//! Terms are word unigrams and bigrams built from lowercase tokens of at least
//! two characters. Weights are raw term counts multiplied by a smoothed inverse
//! document frequency, and every vector is L2-normalized so that the dot
//! product of two vectors is their cosine similarity.

use std::collections::{BTreeSet, HashMap};

use crate::config::RetrievalConfig;

/// Sparse vector of `(term index, weight)` pairs sorted by term index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Build from unsorted entries; duplicate indices are summed
    pub fn from_entries(mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_by_key(|(idx, _)| *idx);
        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (idx, weight) in entries {
            match merged.last_mut() {
                Some((last, acc)) if *last == idx => *acc += weight,
                _ => merged.push((idx, weight)),
            }
        }
        Self { entries: merged }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Cosine similarity clamped to [0, 1]; zero when either side is empty
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return 0.0;
        }
        (self.dot(other) / denom).clamp(0.0, 1.0)
    }

    fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
        self
    }
}

/// Feature space parameters
#[derive(Debug, Clone, PartialEq)]
pub struct VectorizerParams {
    pub max_features: usize,
    pub ngram_min: usize,
    pub ngram_max: usize,
    pub min_df: usize,
}

impl Default for VectorizerParams {
    fn default() -> Self {
        Self {
            max_features: 10_000,
            ngram_min: 1,
            ngram_max: 2,
            min_df: 1,
        }
    }
}

impl From<&RetrievalConfig> for VectorizerParams {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            max_features: config.max_features,
            ngram_min: config.ngram_min,
            ngram_max: config.ngram_max,
            min_df: config.min_df,
        }
    }
}

/// Trained vocabulary and IDF weights
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    params: VectorizerParams,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Train on `documents` and return the vectorizer together with the
    /// vector of each document, in input order
    pub fn fit_transform(
        documents: &[&str],
        params: VectorizerParams,
    ) -> (Self, Vec<SparseVector>) {
        let analyzed: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| Self::analyze(doc, &params))
            .collect();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        let mut corpus_frequency: HashMap<&str, usize> = HashMap::new();
        for terms in &analyzed {
            let unique: BTreeSet<&str> = terms.iter().map(String::as_str).collect();
            for term in unique {
                *document_frequency.entry(term).or_default() += 1;
            }
            for term in terms {
                *corpus_frequency.entry(term.as_str()).or_default() += 1;
            }
        }

        let mut kept: Vec<&str> = document_frequency
            .iter()
            .filter(|(_, df)| **df >= params.min_df)
            .map(|(term, _)| *term)
            .collect();

        if kept.len() > params.max_features {
            // Most frequent terms across the corpus win, ties alphabetical
            kept.sort_by(|a, b| {
                corpus_frequency[b]
                    .cmp(&corpus_frequency[a])
                    .then(a.cmp(b))
            });
            kept.truncate(params.max_features);
        }
        kept.sort_unstable();

        let n_docs = documents.len() as f64;
        let vocabulary: HashMap<String, usize> = kept
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.to_string(), idx))
            .collect();
        let idf: Vec<f64> = kept
            .iter()
            .map(|term| {
                let df = document_frequency[term] as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vectorizer = Self {
            params,
            vocabulary,
            idf,
        };
        let vectors = analyzed
            .iter()
            .map(|terms| vectorizer.weigh(terms))
            .collect();

        (vectorizer, vectors)
    }

    /// Project text into the trained space; unknown terms are dropped
    pub fn transform(&self, text: &str) -> SparseVector {
        let terms = Self::analyze(text, &self.params);
        self.weigh(&terms)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    fn weigh(&self, terms: &[String]) -> SparseVector {
        let entries = terms
            .iter()
            .filter_map(|term| self.vocabulary.get(term))
            .map(|&idx| (idx, self.idf[idx]))
            .collect();
        SparseVector::from_entries(entries).normalized()
    }

    fn analyze(text: &str, params: &VectorizerParams) -> Vec<String> {
        let tokens = Self::tokenize(text);
        Self::ngrams(&tokens, params.ngram_min, params.ngram_max)
    }

    /// Lowercase word tokens of two or more characters
    pub(crate) fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| s.chars().count() >= 2)
            .map(|s| s.to_string())
            .collect()
    }

    pub(crate) fn ngrams(tokens: &[String], min_n: usize, max_n: usize) -> Vec<String> {
        let mut terms = Vec::new();
        for n in min_n.max(1)..=max_n {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }
}
