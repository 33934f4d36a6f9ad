//! Runtime options supplied by the host page.

use serde::{Deserialize, Serialize};

/// Default upper bound for an accepted file (100 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// The only media type the loader accepts
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Files larger than this are rejected before they are read
    pub max_file_size_bytes: u64,
    /// Compress streams in the extracted document
    pub compress_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE,
            compress_output: true,
        }
    }
}
