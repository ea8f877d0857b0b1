//! Error types for stylecull operations.

use thiserror::Error;

/// Errors that can occur during template analysis or rewriting.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed attribute-value DSL text. Always fatal to the single parse;
    /// there is no partial result.
    #[error("invalid attribute value at offset {offset}: {message}")]
    ValueSyntax { message: String, offset: usize },

    /// A DSL error annotated with the attribute it came from.
    #[error("in attribute `{name}`: {source}")]
    InAttribute {
        name: String,
        #[source]
        source: Box<Error>,
    },

    /// A selector string that could not be parsed at all.
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    /// A selector feature the matcher does not support. Guessing here would
    /// break the cascade-preservation guarantee, so this is fatal.
    #[error("unsupported selector feature: {0}")]
    UnsupportedSelector(String),
}

impl Error {
    pub(crate) fn value_syntax(message: impl Into<String>, offset: usize) -> Self {
        Error::ValueSyntax {
            message: message.into(),
            offset,
        }
    }

    /// Wrap an error with the name of the attribute being analyzed.
    pub fn in_attribute(self, name: impl Into<String>) -> Self {
        Error::InAttribute {
            name: name.into(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
