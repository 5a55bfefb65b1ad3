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
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use crate::cli::{Commands, OutputFormat};
use crate::completion::create_completion_provider;
use crate::config::Config;
use crate::corpus::{CorpusIndex, VectorizerParams};
use crate::mcp::McpServer;
use crate::qa::formatting::{format_query_result, format_ranked, format_stats};
use crate::qa::history::{load_questions, save_results};
use crate::qa::{QueryOrchestrator, QueryResult};

const QUIT_WORDS: &[&str] = &["quit", "exit", "q", "종료"];

pub async fn execute(
    config: &Config,
    corpus_override: Option<PathBuf>,
    command: Commands,
) -> Result<()> {
    let corpus_path = corpus_override.unwrap_or_else(|| config.corpus.path.clone());

    match command {
        Commands::Ask {
            question,
            max_patents,
            format,
        } => {
            let orchestrator = build_orchestrator(config, &corpus_path)?;
            let max_patents = max_patents.unwrap_or(config.retrieval.max_patents);
            let result = orchestrator.ask(&question, max_patents).await;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                OutputFormat::Text => print!("{}", format_query_result(&result)),
            }
        }

        Commands::Batch {
            input,
            output,
            max_patents,
        } => {
            let questions = load_questions(&input)?;
            if questions.is_empty() {
                return Err(anyhow::anyhow!("No questions found in {}", input.display()));
            }
            let orchestrator = build_orchestrator(config, &corpus_path)?;
            let max_patents = max_patents.unwrap_or(config.retrieval.max_patents);

            let results = orchestrator.batch(&questions, max_patents).await;
            for result in &results {
                print!("{}", format_query_result(result));
            }
            save_results(&output, &results)?;

            let answered = results.iter().filter(|r| r.has_answers()).count();
            println!(
                "{}",
                format!(
                    "{} of {} questions answered, results saved to {}",
                    answered,
                    results.len(),
                    output.display()
                )
                .green()
            );
        }

        Commands::Chat {
            max_patents,
            history,
        } => {
            let orchestrator = build_orchestrator(config, &corpus_path)?;
            let max_patents = max_patents.unwrap_or(config.retrieval.max_patents);
            let input = BufReader::new(tokio::io::stdin());
            run_chat(&orchestrator, max_patents, &history, input).await?;
        }

        Commands::Rank {
            question,
            limit,
            format,
        } => {
            let index = load_index(config, &corpus_path)?;
            let limit = limit.unwrap_or(config.retrieval.max_patents);
            let candidates = index.rank(&question, limit);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&candidates)?),
                OutputFormat::Text => {
                    let summary_of = |id: &str| {
                        index
                            .get(id)
                            .map(|record| record.summary.clone())
                            .unwrap_or_default()
                    };
                    print!("{}", format_ranked(&candidates, summary_of));
                }
            }
        }

        Commands::Stats => {
            let index = load_index(config, &corpus_path)?;
            print!("{}", format_stats(&index.stats()));
        }

        Commands::Mcp { .. } => {
            let orchestrator = build_orchestrator(config, &corpus_path)?;
            let server = McpServer::new(Arc::new(orchestrator));
            server.run().await?;
        }
    }

    Ok(())
}

fn load_index(config: &Config, corpus_path: &Path) -> Result<Arc<CorpusIndex>> {
    let index = CorpusIndex::load(corpus_path, VectorizerParams::from(&config.retrieval))
        .inspect_err(|e| error!(path = %e.path().display(), "Corpus could not be loaded"))?;
    if index.is_empty() {
        warn!(path = %corpus_path.display(), "Corpus contains no patents");
    }
    info!(
        patents = index.len(),
        path = %corpus_path.display(),
        fingerprint = %index.fingerprint(),
        "Corpus loaded"
    );
    Ok(Arc::new(index))
}

fn build_orchestrator(config: &Config, corpus_path: &Path) -> Result<QueryOrchestrator> {
    let provider = create_completion_provider(&config.completion)?;
    let index = load_index(config, corpus_path)?;
    QueryOrchestrator::new(index, provider, config)
}

/// Interactive loop over `input` lines. Whatever ends the session (a quit
/// word, end of input, Ctrl-C or a broken input stream), the answered
/// questions are saved to `history`. Returns the number of saved results.
async fn run_chat<R>(
    orchestrator: &QueryOrchestrator,
    max_patents: usize,
    history: &Path,
    input: R,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    println!(
        "{}",
        format!(
            "{} patents loaded. Ask a question, or type one of {} to leave.",
            orchestrator.index().len(),
            QUIT_WORDS.join(", ")
        )
        .bright_black()
    );

    let mut lines = input.lines();
    let mut session: Vec<QueryResult> = Vec::new();

    loop {
        print!("{} ", ">".cyan().bold());
        std::io::stdout().flush().ok();

        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                println!();
                info!("Chat interrupted");
                break;
            }
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                println!();
                break;
            }
            // The offending line has already been consumed
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                warn!(error = %e, "Skipping unreadable input line");
                continue;
            }
            Err(e) => {
                error!(error = %e, "Input stream failed, ending chat");
                break;
            }
        };

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if QUIT_WORDS.contains(&question.to_lowercase().as_str()) {
            break;
        }

        let result = tokio::select! {
            result = orchestrator.ask(question, max_patents) => result,
            _ = tokio::signal::ctrl_c() => {
                println!();
                info!("Chat interrupted");
                break;
            }
        };
        print!("{}", format_query_result(&result));
        session.push(result);
    }

    if !session.is_empty() {
        save_results(history, &session)?;
        println!("Session saved to {}", history.display());
    }

    Ok(session.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::stub::ScriptedCompletion;
    use crate::corpus::types::{ContentChunk, PatentRecord};

    fn orchestrator() -> QueryOrchestrator {
        let record = PatentRecord {
            id: "1020230000001".to_string(),
            summary: "battery cooling plate".to_string(),
            chunks: vec![ContentChunk {
                text: "A cold plate cools the cells.".to_string(),
                ..ContentChunk::default()
            }],
        };
        let index = CorpusIndex::from_records(vec![record], VectorizerParams::default());
        let stub = Arc::new(ScriptedCompletion::constant("A cold plate cools the cells."));
        let mut config = Config::default();
        config.prompts.locale = Some("en".to_string());
        QueryOrchestrator::new(Arc::new(index), stub, &config).unwrap()
    }

    async fn chat(input: &[u8], history: &Path) -> usize {
        run_chat(&orchestrator(), 3, history, BufReader::new(input))
            .await
            .unwrap()
    }

    fn saved_questions(history: &Path) -> Vec<String> {
        let content = std::fs::read_to_string(history).unwrap();
        let results: Vec<QueryResult> = serde_json::from_str(&content).unwrap();
        results.into_iter().map(|r| r.question).collect()
    }

    #[tokio::test]
    async fn test_chat_skips_invalid_utf8_and_saves_session() {
        let dir = tempfile::tempdir().unwrap();
        let history = dir.path().join("chat_history.json");

        let saved = chat(
            b"quantum entanglement\n\xff\xfe bad\nbattery cooling?\nquit\nnever asked\n",
            &history,
        )
        .await;

        assert_eq!(saved, 2);
        assert_eq!(
            saved_questions(&history),
            vec!["quantum entanglement", "battery cooling?"]
        );
    }

    #[tokio::test]
    async fn test_chat_saves_on_end_of_input() {
        let dir = tempfile::tempdir().unwrap();
        let history = dir.path().join("chat_history.json");

        let saved = chat("\n  \n배터리 냉각 방식은?".as_bytes(), &history).await;

        assert_eq!(saved, 1);
        assert_eq!(saved_questions(&history), vec!["배터리 냉각 방식은?"]);
    }

    #[tokio::test]
    async fn test_chat_quit_words_are_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let history = dir.path().join("chat_history.json");

        let saved = chat("EXIT\nbattery cooling?\n".as_bytes(), &history).await;

        assert_eq!(saved, 0);
        assert!(!history.exists(), "empty session writes nothing");
    }
}
