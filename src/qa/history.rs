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

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::types::QueryResult;

/// Write results as a pretty JSON array, creating parent directories
pub fn save_results(path: &Path, results: &[QueryResult]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write results to {}", path.display()))?;

    info!(path = %path.display(), results = results.len(), "Results saved");
    Ok(())
}

/// Questions from a JSON array of strings, or one question per line
pub fn load_questions(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read questions from {}", path.display()))?;

    if content.trim_start().starts_with('[') {
        let questions: Vec<String> = serde_json::from_str(&content).with_context(|| {
            format!("Questions file {} is not a JSON array of strings", path.display())
        })?;
        return Ok(questions);
    }

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn result(question: &str) -> QueryResult {
        QueryResult {
            question: question.to_string(),
            answer: "답변".to_string(),
            application_numbers: vec!["1020230000001".to_string()],
            similarity_scores: vec![0.42],
            patents_with_answers: vec!["1020230000001".to_string()],
            total_chunks_reviewed: 3,
            total_valid_answers: 1,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_save_results_writes_array_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("batch_results.json");

        save_results(&path, &[result("first?"), result("second?")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("답변"), "Non-ASCII text is written unescaped");
        let parsed: Vec<QueryResult> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].question, "first?");
        assert_eq!(parsed[1].question, "second?");
        assert_eq!(parsed[0].similarity_scores, vec![0.42]);
    }

    #[test]
    fn test_payload_field_names() {
        let value = serde_json::to_value(result("q")).unwrap();
        for field in [
            "question",
            "answer",
            "application_numbers",
            "similarity_scores",
            "patents_with_answers",
            "total_chunks_reviewed",
            "total_valid_answers",
            "timestamp",
        ] {
            assert!(value.get(field).is_some(), "missing field {}", field);
        }
    }

    #[test]
    fn test_load_questions_from_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.txt");
        std::fs::write(&path, "What cools the cells?\n\n  How is the pack sealed?  \n").unwrap();

        let questions = load_questions(&path).unwrap();
        assert_eq!(questions, vec!["What cools the cells?", "How is the pack sealed?"]);
    }

    #[test]
    fn test_load_questions_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");
        std::fs::write(&path, r#"["배터리 냉각 방식은?", "line\nbreak"]"#).unwrap();

        let questions = load_questions(&path).unwrap();
        assert_eq!(questions, vec!["배터리 냉각 방식은?", "line\nbreak"]);
    }

    #[test]
    fn test_load_questions_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(load_questions(&path).is_err());
    }
}
