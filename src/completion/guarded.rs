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
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::{CompletionError, CompletionProvider, CompletionRequest};
use crate::config::CompletionConfig;

/// Per-call timeout and bounded retries around another provider.
///
/// A timeout is reported as [`CompletionError::Timeout`] and treated like any
/// other failure. Retries only happen for retryable errors, with the delay
/// doubling after every attempt.
pub struct GuardedCompletion {
    inner: Arc<dyn CompletionProvider>,
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
}

impl GuardedCompletion {
    pub fn new(inner: Arc<dyn CompletionProvider>, timeout: Duration) -> Self {
        Self {
            inner,
            timeout,
            max_retries: 0,
            backoff: Duration::from_millis(500),
        }
    }

    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.backoff = backoff;
        self
    }

    pub fn from_config(inner: Arc<dyn CompletionProvider>, config: &CompletionConfig) -> Self {
        Self::new(inner, Duration::from_secs(config.timeout_secs)).with_retries(
            config.max_retries,
            Duration::from_millis(config.retry_backoff_ms),
        )
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        match tokio::time::timeout(self.timeout, self.inner.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl CompletionProvider for GuardedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let mut attempt = 0u32;
        loop {
            let err = match self.attempt(request).await {
                Ok(text) => return Ok(text),
                Err(err) => err,
            };

            if attempt >= self.max_retries || !err.is_retryable() {
                return Err(err);
            }

            let delay = self.backoff.saturating_mul(2u32.saturating_pow(attempt));
            warn!(
                attempt = attempt + 1,
                max_retries = self.max_retries,
                delay_ms = delay.as_millis(),
                error = %err,
                "Completion failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
