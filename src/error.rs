//! Error types for parsing and indexing.

use thiserror::Error;

/// Tokenizer-level failure: the input is not well-formed XML.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at byte {position}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }
}

/// Failure carried by an `XmlIndexer::XmlError` result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexingError {
    #[error("XML Attribute Error: Missing attribute [\"{attr}\"]")]
    AttributeNotFound { attr: String },

    #[error("XML Attribute Error: Missing attribute [\"{attr}\"] with value [\"{value}\"]")]
    AttributeValueNotFound { attr: String, value: String },

    #[error("XML Element Error: Incorrect key [\"{key}\"]")]
    KeyNotFound { key: String },

    #[error("XML Element Error: Incorrect index [\"{index}\"]")]
    IndexOutOfRange { index: usize },

    #[error("XML Parse Error: {0}")]
    MalformedInput(#[from] ParseError),

    #[error("XML Indexer Error: initialization with [\"{instance}\"]")]
    InitializationError { instance: String },
}

/// Payload-free classification of an `IndexingError`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AttributeNotFound,
    AttributeValueNotFound,
    KeyNotFound,
    IndexOutOfRange,
    MalformedInput,
    InitializationError,
}

impl IndexingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IndexingError::AttributeNotFound { .. } => ErrorKind::AttributeNotFound,
            IndexingError::AttributeValueNotFound { .. } => ErrorKind::AttributeValueNotFound,
            IndexingError::KeyNotFound { .. } => ErrorKind::KeyNotFound,
            IndexingError::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            IndexingError::MalformedInput(_) => ErrorKind::MalformedInput,
            IndexingError::InitializationError { .. } => ErrorKind::InitializationError,
        }
    }
}

impl ErrorKind {
    /// Snake-case name, used for host-side atoms
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AttributeNotFound => "attribute_not_found",
            ErrorKind::AttributeValueNotFound => "attribute_value_not_found",
            ErrorKind::KeyNotFound => "key_not_found",
            ErrorKind::IndexOutOfRange => "index_out_of_range",
            ErrorKind::MalformedInput => "malformed_input",
            ErrorKind::InitializationError => "initialization_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = IndexingError::KeyNotFound { key: "channel".into() };
        assert_eq!(err.to_string(), "XML Element Error: Incorrect key [\"channel\"]");

        let err = IndexingError::AttributeValueNotFound {
            attr: "id".into(),
            value: "5".into(),
        };
        assert_eq!(
            err.to_string(),
            "XML Attribute Error: Missing attribute [\"id\"] with value [\"5\"]"
        );
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: IndexingError = ParseError::new("Unclosed tag: <rss>", 12).into();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert_eq!(err.to_string(), "XML Parse Error: Unclosed tag: <rss> at byte 12");
        assert_eq!(err.kind().as_str(), "malformed_input");
    }
}
