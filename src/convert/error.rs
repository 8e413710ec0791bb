//! Conversion failures reported by conversion collaborators

use crate::value::TypeClass;
use thiserror::Error;

/// A value could not be turned into the requested class.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("no conversion from {from} to {to}")]
    Unsupported { from: TypeClass, to: TypeClass },

    #[error("cannot parse {input:?} as {target}")]
    Parse { target: TypeClass, input: String },

    #[error("{value} is out of range for {target}")]
    OutOfRange { target: TypeClass, value: String },

    #[error("JSON value {value} does not fit {target}")]
    Shape { target: TypeClass, value: String },

    #[error("malformed JSON payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
