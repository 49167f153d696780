//! Types passed between request handling and access logging

use std::path::PathBuf;

/// What the handler did with a request, attached to the response for the access logger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOutcome {
    /// File streamed in directory mode
    pub served_file: Option<PathBuf>,
}

impl RequestOutcome {
    pub fn served(path: PathBuf) -> Self {
        Self {
            served_file: Some(path),
        }
    }
}
