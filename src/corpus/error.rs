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

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Corpus could not be loaded. Always fatal: nothing can be answered without it.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("corpus file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read corpus file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed corpus file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed corpus file {}: {message}", path.display())]
    InvalidShape { path: PathBuf, message: String },
}

impl DataLoadError {
    /// The corpus file that could not be loaded
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path }
            | Self::Io { path, .. }
            | Self::Malformed { path, .. }
            | Self::InvalidShape { path, .. } => path,
        }
    }
}
