//! Error types for forge data loading.

use thiserror::Error;

/// Errors that can occur when loading mechanic definitions, item presets or
/// the forge config. Callers log these and fall back; they never stop a frame.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// File or directory could not be found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// JSON parsing failed.
    #[error("JSON parse error in '{path}': {details}")]
    JsonError { path: String, details: String },

    /// RON parsing failed.
    #[error("RON parse error in '{path}': {details}")]
    RonError { path: String, details: String },

    /// A mechanic definition was valid JSON but not an object.
    #[error("Definition '{path}' must be a JSON object")]
    NotAnObject { path: String },
}
