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

use std::cmp::Ordering;

use super::vectorizer::SparseVector;

/// Cosine similarity of `query` against every document vector, in order
pub fn cosine_scores(query: &SparseVector, documents: &[SparseVector]) -> Vec<f64> {
    documents.iter().map(|doc| query.cosine(doc)).collect()
}

/// Select at most `k` positions with a strictly positive score.
///
/// Result is sorted by descending score. Equal scores keep their original
/// order, so the lower position wins a tie. Fewer than `k` entries are
/// returned when fewer scores are positive.
pub fn top_k_positive(scores: &[f64], k: usize) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, score)| *score > 0.0)
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.truncate(k);
    ranked
}

/// Rank document vectors against a query vector
pub fn rank_vectors(
    query: &SparseVector,
    documents: &[SparseVector],
    k: usize,
) -> Vec<(usize, f64)> {
    top_k_positive(&cosine_scores(query, documents), k)
}
