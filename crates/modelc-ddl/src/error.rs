//! Generation errors

use thiserror::Error;

/// Errors that stop script generation
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Identifier {identifier} is longer than the {limit} characters {dialect} allows")]
    IdentifierTooLong {
        identifier: String,
        limit: usize,
        dialect: String,
    },

    #[error("Property {class}.{property} has no persistent type")]
    MissingDomain { class: String, property: String },

    #[error("Initializer tables cannot be ordered: {0}")]
    UnorderableInit(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for GenerateError {
    fn from(err: std::io::Error) -> Self {
        GenerateError::Io(err.to_string())
    }
}
