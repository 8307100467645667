use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Parses a JSON file into a given type `T`.
///
/// Errors are converted into `crate::error::Error` variants:
/// - `Error::IoError` if the file cannot be read.
/// - `Error::DeserializationError` if the JSON is malformed.
pub fn parse_json_file<T: DeserializeOwned>(file_path: impl AsRef<Path>) -> Result<T> {
    let data = fs::read_to_string(file_path.as_ref()).map_err(Error::IoError)?;

    let parsed_data: T = serde_json::from_str(&data).map_err(Error::DeserializationError)?;

    Ok(parsed_data)
}

/// Like [`parse_json_file`], but falls back to `T::default()` when no path is given.
pub fn parse_optional_json_file<T: DeserializeOwned + Default>(file_path: Option<&Path>) -> Result<T> {
    match file_path {
        Some(path) => parse_json_file(path),
        None => Ok(T::default()),
    }
}
