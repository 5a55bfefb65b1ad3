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
use serde_json::json;
use tokio::io::{
    stdin, stdout, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tracing::debug;

use crate::mcp::patents::PatentProvider;
use crate::mcp::types::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpError, METHOD_NOT_FOUND, PARSE_ERROR,
};
use crate::qa::QueryOrchestrator;

/// Line-delimited JSON-RPC server exposing the patent tools
pub struct McpServer {
    patents: PatentProvider,
}

impl McpServer {
    pub fn new(orchestrator: Arc<QueryOrchestrator>) -> Self {
        Self {
            patents: PatentProvider::new(orchestrator),
        }
    }

    /// Run the MCP server on stdio
    pub async fn run(&self) -> Result<()> {
        self.serve(BufReader::new(stdin()), stdout()).await
    }

    /// Serve requests until the reader reaches EOF
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                debug!("EOF received, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            debug!("Received request: {}", trimmed);

            let response = match serde_json::from_str::<JsonRpcRequest>(trimmed) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => JsonRpcResponse::failure(
                    None,
                    JsonRpcError {
                        code: PARSE_ERROR,
                        message: format!("Parse error: {}", e),
                        data: None,
                    },
                ),
            };

            let response_json = serde_json::to_string(&response)?;
            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        Ok(())
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                id,
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {
                        "tools": {}
                    },
                    "serverInfo": {
                        "name": "patent-qa",
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            ),

            "tools/list" => {
                let tools = PatentProvider::get_tool_definitions();
                JsonRpcResponse::success(id, json!({ "tools": tools }))
            }

            "tools/call" => {
                let params = request.params.unwrap_or(json!({}));
                let tool_name = params["name"].as_str().unwrap_or("");
                let arguments = &params["arguments"];

                let result = match tool_name {
                    "ask_patents" => self.patents.execute_ask(arguments).await,
                    "rank_patents" => self.patents.execute_rank(arguments).await,
                    _ => Err(McpError::method_not_found(
                        format!("Unknown tool: {}", tool_name),
                        "tools/call",
                    )),
                };

                match result {
                    Ok(content) => JsonRpcResponse::success(
                        id,
                        json!({
                            "content": [{
                                "type": "text",
                                "text": content
                            }]
                        }),
                    ),
                    Err(e) => JsonRpcResponse::failure(id, e.into_jsonrpc()),
                }
            }

            _ => JsonRpcResponse::failure(
                id,
                JsonRpcError {
                    code: METHOD_NOT_FOUND,
                    message: format!("Method not found: {}", request.method),
                    data: None,
                },
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::stub::ScriptedCompletion;
    use crate::config::Config;
    use crate::corpus::types::{ContentChunk, PatentRecord};
    use crate::corpus::{CorpusIndex, VectorizerParams};
    use serde_json::Value;

    fn server() -> McpServer {
        let record = PatentRecord {
            id: "1020230000001".to_string(),
            summary: "battery cooling plate".to_string(),
            chunks: vec![ContentChunk {
                text: "A cold plate cools the cells.".to_string(),
                ..ContentChunk::default()
            }],
        };
        let index = Arc::new(CorpusIndex::from_records(
            vec![record],
            VectorizerParams::default(),
        ));
        let stub = Arc::new(ScriptedCompletion::constant("A cold plate cools the cells."));
        let mut config = Config::default();
        config.prompts.locale = Some("en".to_string());
        let orchestrator = QueryOrchestrator::new(index, stub, &config).unwrap();
        McpServer::new(Arc::new(orchestrator))
    }

    async fn exchange(input: &str) -> Vec<Value> {
        let mut output: Vec<u8> = Vec::new();
        server()
            .serve(BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_initialize_and_list_tools() {
        let responses = exchange(concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
        ))
        .await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "patent-qa");
        assert_eq!(responses[1]["id"], 2);
        assert_eq!(responses[1]["result"]["tools"][0]["name"], "ask_patents");
    }

    #[tokio::test]
    async fn test_parse_error() {
        let responses = exchange("{not json\n").await;
        assert_eq!(responses[0]["error"]["code"], PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_unknown_method_and_tool() {
        let responses = exchange(concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"resources/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","#,
            r#""params":{"name":"nope","arguments":{}}}"#,
            "\n",
        ))
        .await;
        assert_eq!(responses[0]["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(responses[1]["error"]["code"], METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ask_tool_returns_query_result() {
        let responses = exchange(concat!(
            r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"ask_patents","#,
            r#""arguments":{"question":"How does the battery cooling work?"}}}"#,
            "\n",
        ))
        .await;

        let text = responses[0]["result"]["content"][0]["text"].as_str().unwrap();
        let result: Value = serde_json::from_str(text).unwrap();
        assert_eq!(result["application_numbers"][0], "1020230000001");
        assert_eq!(result["patents_with_answers"][0], "1020230000001");
        assert_eq!(result["total_valid_answers"], 1);
    }
}
