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

use std::io::Write;

use super::error::DataLoadError;
use super::types::{ContentChunk, PatentRecord};
use super::{CorpusIndex, VectorizerParams};

fn record(id: &str, summary: &str, chunks: &[&str]) -> PatentRecord {
    PatentRecord {
        id: id.to_string(),
        summary: summary.to_string(),
        chunks: chunks
            .iter()
            .map(|text| ContentChunk {
                text: text.to_string(),
                ..ContentChunk::default()
            })
            .collect(),
    }
}

fn write_corpus(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_preserves_file_order() {
    let file = write_corpus(
        r#"{
            "1020230000003": {"patent_summary": "zinc anode", "content_chunks": [{"text": "a"}]},
            "1020230000001": {"patent_summary": "lithium cathode", "content_chunks": []},
            "1020230000002": {
                "patent_summary": "",
                "content_chunks": [{"text": "b", "section": "claims"}]
            }
        }"#,
    );

    let index = CorpusIndex::load(file.path(), VectorizerParams::default()).unwrap();
    let ids: Vec<&str> = index.records().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1020230000003", "1020230000001", "1020230000002"]);

    let third = index.get("1020230000002").unwrap();
    assert_eq!(third.chunks[0].metadata["section"], "claims");
}

#[test]
fn test_load_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    match CorpusIndex::load(&path, VectorizerParams::default()) {
        Err(DataLoadError::NotFound { path: reported }) => assert_eq!(reported, path),
        other => panic!("expected NotFound, got {:?}", other.err()),
    }
}

#[test]
fn test_load_invalid_json_is_malformed() {
    let file = write_corpus("{ not json");
    let err = CorpusIndex::load(file.path(), VectorizerParams::default())
        .err()
        .unwrap();
    assert!(matches!(err, DataLoadError::Malformed { .. }));
    assert_eq!(err.path(), file.path());
}

#[test]
fn test_load_non_object_root_is_rejected() {
    let file = write_corpus(r#"[{"patent_summary": "x"}]"#);
    let err = CorpusIndex::load(file.path(), VectorizerParams::default())
        .err()
        .unwrap();
    assert!(matches!(err, DataLoadError::InvalidShape { .. }));
}

#[test]
fn test_load_wrong_field_type_is_malformed() {
    let file = write_corpus(r#"{"A": {"patent_summary": 42, "content_chunks": []}}"#);
    let err = CorpusIndex::load(file.path(), VectorizerParams::default())
        .err()
        .unwrap();
    assert!(matches!(err, DataLoadError::Malformed { .. }));
}

#[test]
fn test_rank_excludes_zero_similarity() {
    let index = CorpusIndex::from_records(
        vec![
            record("A", "hydraulic brake caliper", &[]),
            record("B", "solar panel mounting bracket", &[]),
        ],
        VectorizerParams::default(),
    );

    let ranked = index.rank("How is the solar panel mounted?", 3);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].patent_id, "B");
    assert_eq!(ranked[0].corpus_index, 1);
    assert!(ranked[0].score > 0.0 && ranked[0].score <= 1.0);
}

#[test]
fn test_rank_no_shared_terms_is_empty() {
    let index = CorpusIndex::from_records(
        vec![record("A", "hydraulic brake caliper", &[])],
        VectorizerParams::default(),
    );
    assert!(index.rank("quantum entanglement", 3).is_empty());
}

#[test]
fn test_rank_ties_prefer_corpus_order() {
    let index = CorpusIndex::from_records(
        vec![
            record("first", "battery cooling", &[]),
            record("other", "gearbox housing", &[]),
            record("second", "battery cooling", &[]),
        ],
        VectorizerParams::default(),
    );

    let ranked = index.rank("battery cooling", 5);
    let ids: Vec<&str> = ranked.iter().map(|c| c.patent_id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second"]);
    assert_eq!(ranked[0].score, ranked[1].score);
}

#[test]
fn test_rank_is_idempotent() {
    let index = CorpusIndex::from_records(
        vec![
            record("A", "battery cooling plate with coolant channel", &[]),
            record("B", "battery housing", &[]),
            record("C", "coolant pump", &[]),
        ],
        VectorizerParams::default(),
    );

    let first = index.rank("battery coolant", 2);
    assert_eq!(first.len(), 2);
    for _ in 0..5 {
        assert_eq!(index.rank("battery coolant", 2), first);
    }
}

#[test]
fn test_empty_summaries_are_legal() {
    let index = CorpusIndex::from_records(
        vec![record("A", "", &["text"]), record("B", "  ", &[])],
        VectorizerParams::default(),
    );
    assert_eq!(index.len(), 2);
    assert!(index.rank("anything at all", 3).is_empty());

    let stats = index.stats();
    assert_eq!(stats.empty_summaries, 2);
    assert_eq!(stats.vocabulary_size, 0);
}

#[test]
fn test_stats_count_answerable_chunks() {
    let index = CorpusIndex::from_records(
        vec![
            record("A", "battery", &["one", "   ", "two"]),
            record("B", "motor", &[""]),
        ],
        VectorizerParams::default(),
    );

    let stats = index.stats();
    assert_eq!(stats.total_patents, 2);
    assert_eq!(stats.total_chunks, 4);
    assert_eq!(stats.answerable_chunks, 2);
    assert_eq!(stats.fingerprint.len(), 64);
}
