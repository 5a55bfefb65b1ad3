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
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "patent-qa")]
#[command(version, author = "Muvon Un Limited <opensource@muvon.io>")]
#[command(about = "Question answering over a pre-chunked patent corpus", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to the system config, created on first run)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Corpus JSON file, overriding the configured path
    #[arg(long, global = true)]
    pub corpus: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a single question
    Ask {
        /// The question to answer
        question: String,

        /// Maximum number of patents to consult
        #[arg(short, long)]
        max_patents: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Answer every question in a file and save the results
    Batch {
        /// Questions file: a JSON array of strings or one question per line
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the results
        #[arg(short, long, default_value = "batch_results.json")]
        output: PathBuf,

        /// Maximum number of patents to consult per question
        #[arg(short, long)]
        max_patents: Option<usize>,
    },

    /// Interactive question loop
    Chat {
        /// Maximum number of patents to consult per question
        #[arg(short, long)]
        max_patents: Option<usize>,

        /// Where to write the session history on exit
        #[arg(long, default_value = "chat_history.json")]
        history: PathBuf,
    },

    /// Show the patents most similar to a question without answering it
    Rank {
        /// The question or search text
        question: String,

        /// Maximum number of patents to list
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show corpus statistics
    Stats,

    /// Start MCP server (Model Context Protocol) exposing the patent tools
    Mcp {
        /// Log at debug level
        #[arg(long)]
        debug: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_arguments() {
        let cli = Cli::parse_from([
            "patent-qa",
            "--corpus",
            "data.json",
            "ask",
            "배터리 냉각 방식은?",
            "-m",
            "5",
            "--format",
            "json",
        ]);
        assert_eq!(cli.corpus, Some(PathBuf::from("data.json")));
        match cli.command {
            Commands::Ask {
                question,
                max_patents,
                format,
            } => {
                assert_eq!(question, "배터리 냉각 방식은?");
                assert_eq!(max_patents, Some(5));
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_batch_defaults() {
        let cli = Cli::parse_from([
            "patent-qa",
            "batch",
            "--input",
            "questions.txt",
            "--config",
            "c.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        match cli.command {
            Commands::Batch { output, max_patents, .. } => {
                assert_eq!(output, PathBuf::from("batch_results.json"));
                assert_eq!(max_patents, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_command_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
