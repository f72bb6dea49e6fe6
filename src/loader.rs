//! Loading operation documents and option files from disk.

use std::path::Path;

use serde_json::Value;

use crate::config::TryItOutOptions;
use crate::error::LoadError;
use crate::operation::JsonOperation;

/// Read a file to a string.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist, or
/// `LoadError::ReadError` if it can't be read.
pub fn read_file(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a JSON document from a file path.
///
/// # Errors
///
/// Returns the errors of [`read_file`], or `LoadError::InvalidJson` if the
/// file isn't valid JSON.
pub fn load_json(path: &Path) -> Result<Value, LoadError> {
    let content = read_file(path)?;
    load_json_str(&content)
}

/// Parse a JSON document from a string.
pub fn load_json_str(content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load an operation document. See [`JsonOperation`] for the shape.
pub fn load_operation(path: &Path) -> Result<JsonOperation, LoadError> {
    load_json(path).map(JsonOperation::new)
}

/// Load widget options from a JSON file with camelCase keys.
pub fn load_options(path: &Path) -> Result<TryItOutOptions, LoadError> {
    let value = load_json(path)?;
    serde_json::from_value(value).map_err(|source| LoadError::InvalidOptions { source })
}
