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

use colored::Colorize;

use super::types::QueryResult;
use crate::corpus::{CorpusStats, RankedCandidate};

pub fn format_query_result(result: &QueryResult) -> String {
    let mut output = String::new();

    output.push_str(&"━".repeat(60));
    output.push('\n');
    output.push_str(&result.question.bold().to_string());
    output.push('\n');

    if result.application_numbers.is_empty() {
        output.push_str(&result.answer.yellow().to_string());
        output.push('\n');
        return output;
    }

    for (rank, (id, score)) in result
        .application_numbers
        .iter()
        .zip(&result.similarity_scores)
        .enumerate()
    {
        let marker = if result.patents_with_answers.contains(id) {
            "✓".green()
        } else {
            "-".bright_black()
        };
        output.push_str(&format!(
            "  {} {}. {} {}\n",
            marker,
            rank + 1,
            id.cyan(),
            format!("(similarity {:.3})", score).bright_black()
        ));
    }

    output.push_str(
        &format!(
            "{} chunks reviewed, {} valid answers",
            result.total_chunks_reviewed, result.total_valid_answers
        )
        .bright_black()
        .to_string(),
    );
    output.push_str("\n\n");
    output.push_str(&result.answer);
    output.push('\n');

    output
}

pub fn format_ranked(
    candidates: &[RankedCandidate],
    summary_of: impl Fn(&str) -> String,
) -> String {
    if candidates.is_empty() {
        return "No relevant patents found".to_string();
    }

    let mut output = String::new();
    for (rank, candidate) in candidates.iter().enumerate() {
        let score_pct = (candidate.score * 100.0) as u32;
        output.push_str(&format!(
            "{}. {} {}\n",
            rank + 1,
            candidate.patent_id.blue().bold(),
            format!("{}% similar", score_pct).green()
        ));

        let summary = summary_of(&candidate.patent_id);
        let preview = if summary.chars().count() > 200 {
            format!("{}...", truncate_chars(&summary, 200))
        } else {
            summary
        };
        if !preview.is_empty() {
            output.push_str(&preview);
            output.push('\n');
        }
        output.push('\n');
    }

    output
}

pub fn format_stats(stats: &CorpusStats) -> String {
    let mut output = String::new();

    output.push_str(&"Patent Corpus Statistics".bold().to_string());
    output.push('\n');
    output.push_str(&format!("Total Patents: {}", stats.total_patents));
    output.push('\n');
    output.push_str(&format!(
        "Total Chunks: {} ({} answerable)",
        stats.total_chunks, stats.answerable_chunks
    ));
    output.push('\n');

    if stats.total_patents > 0 {
        let avg = stats.total_chunks / stats.total_patents;
        output.push_str(&format!("Average Chunks/Patent: {}", avg));
        output.push('\n');
    }

    output.push_str(&format!("Empty Summaries: {}", stats.empty_summaries));
    output.push('\n');
    output.push_str(&format!("Vocabulary Size: {}", stats.vocabulary_size));
    output.push('\n');
    output.push_str(&format!(
        "Fingerprint: {}",
        stats.fingerprint.bright_black()
    ));
    output.push('\n');

    output
}

fn truncate_chars(input: &str, max_chars: usize) -> String {
    input.chars().take(max_chars).collect()
}
