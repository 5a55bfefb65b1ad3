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

use serde_json::{json, Value};
use tracing::debug;

use crate::mcp::types::{McpError, McpTool};
use crate::qa::QueryOrchestrator;

const MAX_PATENTS_LIMIT: u64 = 20;

/// Patent question answering tools
#[derive(Clone)]
pub struct PatentProvider {
    orchestrator: Arc<QueryOrchestrator>,
}

impl PatentProvider {
    pub fn new(orchestrator: Arc<QueryOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub fn get_tool_definitions() -> Vec<McpTool> {
        vec![
            McpTool {
                name: "ask_patents".to_string(),
                description: "Answer a natural-language question from the patent corpus. Finds the most relevant patents by summary similarity, extracts grounded answers from every chunk of each, and merges them into one answer. The result lists the application numbers consulted, their similarity scores, and which of them actually contributed an answer.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "question": {
                            "type": "string",
                            "description": "The question to answer",
                            "minLength": 1
                        },
                        "max_patents": {
                            "type": "integer",
                            "description": "Maximum number of patents to consult (default from configuration)",
                            "minimum": 1,
                            "maximum": MAX_PATENTS_LIMIT
                        }
                    },
                    "required": ["question"],
                    "additionalProperties": false
                }),
            },
            McpTool {
                name: "rank_patents".to_string(),
                description: "List the patents whose summaries are most similar to a question, without generating an answer.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "question": {
                            "type": "string",
                            "description": "The question or search text",
                            "minLength": 1
                        },
                        "limit": {
                            "type": "integer",
                            "description": "Maximum number of patents to return",
                            "minimum": 1,
                            "maximum": MAX_PATENTS_LIMIT
                        }
                    },
                    "required": ["question"],
                    "additionalProperties": false
                }),
            },
        ]
    }

    pub async fn execute_ask(&self, arguments: &Value) -> Result<String, McpError> {
        let question = required_question(arguments, "ask_patents")?;
        let max_patents = optional_limit(arguments, "max_patents", "ask_patents")?
            .unwrap_or_else(|| self.orchestrator.default_max_patents());

        debug!(max_patents, "ask_patents called");
        let result = self.orchestrator.ask(question, max_patents).await;

        serde_json::to_string_pretty(&result).map_err(|e| {
            McpError::internal_error(format!("Failed to serialize result: {}", e), "ask_patents")
        })
    }

    pub async fn execute_rank(&self, arguments: &Value) -> Result<String, McpError> {
        let question = required_question(arguments, "rank_patents")?;
        let limit = optional_limit(arguments, "limit", "rank_patents")?
            .unwrap_or_else(|| self.orchestrator.default_max_patents());

        let candidates = self.orchestrator.rank(question, limit);
        if candidates.is_empty() {
            return Ok("No relevant patents found".to_string());
        }

        serde_json::to_string_pretty(&candidates).map_err(|e| {
            McpError::internal_error(format!("Failed to serialize ranking: {}", e), "rank_patents")
        })
    }
}

fn required_question<'a>(arguments: &'a Value, operation: &str) -> Result<&'a str, McpError> {
    arguments
        .get("question")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| McpError::invalid_params("Missing required parameter: question", operation))
}

fn optional_limit(
    arguments: &Value,
    field: &str,
    operation: &str,
) -> Result<Option<usize>, McpError> {
    match arguments.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match value.as_u64() {
            Some(n) if (1..=MAX_PATENTS_LIMIT).contains(&n) => Ok(Some(n as usize)),
            _ => Err(McpError::invalid_params(
                format!("{} must be an integer between 1 and {}", field, MAX_PATENTS_LIMIT),
                operation,
            )),
        },
    }
}
