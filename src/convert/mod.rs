//! Conversion collaborators
//!
//! The adapter treats both as black boxes: a class-to-class conversion
//! service for plain values, and an envelope converter for payloads.

mod envelope;
mod error;
mod service;

pub use envelope::{ContentTypeEnvelopeConverter, EnvelopeConverter, DEFAULT_CONTENT_TYPE};
pub use error::ConversionError;
pub use service::{ConversionService, DefaultConversionService};
