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

//! Deterministic provider for tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{CompletionError, CompletionProvider, CompletionRequest};

type Responder = dyn Fn(&CompletionRequest, usize) -> Result<String, CompletionError> + Send + Sync;

/// Answers every request through a closure that sees the request and the
/// zero-based call number. Records all requests it receives.
pub struct ScriptedCompletion {
    responder: Box<Responder>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&CompletionRequest, usize) -> Result<String, CompletionError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn constant(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_, _| Ok(text.clone()))
    }

    pub fn failing_status(status: u16) -> Self {
        Self::new(move |_, _| {
            Err(CompletionError::HttpStatus {
                status,
                snippet: "scripted failure".to_string(),
            })
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(request, call)
    }
}
