//! Project error types

use hitframe_animation::AnimationError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building, loading or saving projects
#[derive(Error, Debug)]
pub enum ProjectError {
    /// Reading or writing a project file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A project file is not a valid document
    #[error("Invalid project document: {0}")]
    Json(#[from] serde_json::Error),

    /// No object with this name exists
    #[error("Unknown object: {0}")]
    UnknownObject(String),

    /// The object has no property with this name
    #[error("Object '{object}' has no property '{property}'")]
    UnknownProperty { object: String, property: String },

    /// Two objects share a name
    #[error("Duplicate object name: {0}")]
    DuplicateObject(String),

    /// A track edit was rejected
    #[error(transparent)]
    Animation(#[from] AnimationError),
}

/// Result type for project operations
pub type Result<T> = std::result::Result<T, ProjectError>;
