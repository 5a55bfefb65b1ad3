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
//! Question answering over the ranked corpus: per-chunk answers, per-patent
//! collection, multi-document synthesis and the orchestration that ties them
//! together.

pub mod answerer;
pub mod collector;
pub mod formatting;
pub mod history;
pub mod orchestrator;
pub mod prompts;
pub mod synthesizer;
pub mod types;


pub use orchestrator::QueryOrchestrator;
pub use types::QueryResult;
