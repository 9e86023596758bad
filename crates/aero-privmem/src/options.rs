use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{PrivMemError, Result};

/// Runtime options accepted by [`crate::PrivMemDriver`].
///
/// `filename` may carry a protocol prefix such as `privmem:`; everything up to and including
/// the first `:` is stripped before the path is handed to the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivMemOptions {
    pub filename: String,
}

impl PrivMemOptions {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if strip_protocol(&self.filename).is_empty() {
            return Err(PrivMemError::InvalidOptions("filename must not be empty"));
        }
        Ok(())
    }

    pub fn resolved_path(&self) -> &Path {
        Path::new(strip_protocol(&self.filename))
    }
}

/// Drop a leading `<scheme>:` from `filename`, if present.
///
/// Only the first `:` is significant, so `privmem:/img:v2` resolves to `/img:v2`.
pub fn strip_protocol(filename: &str) -> &str {
    match filename.split_once(':') {
        Some((_, rest)) => rest,
        None => filename,
    }
}
