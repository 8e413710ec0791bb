//! Adapter error taxonomy

use crate::convert::ConversionError;
use crate::value::TypeClass;
use thiserror::Error;

/// Errors raised while adapting an input to a unit's declared types.
///
/// Every variant that concerns a unit carries its label (e.g. `[uppercase]`)
/// so a signature mismatch can be diagnosed from the message alone.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("arity mismatch for {unit}: declared {expected} argument(s), received {actual}")]
    ArityMismatch {
        unit: String,
        expected: usize,
        actual: usize,
    },

    #[error("input of {unit} is not composite; argument introspection requires a composite input")]
    NotComposite { unit: String },

    #[error("argument index {index} out of range for {unit} with {slots} slot(s)")]
    SlotOutOfRange {
        unit: String,
        index: usize,
        slots: usize,
    },

    #[error("composite input must have 2..=8 elements, found {arity}")]
    InvalidComposite { arity: usize },

    #[error("illegal synchronicity for {unit}: {detail}")]
    IllegalSynchronicity { unit: String, detail: String },

    #[error("failed to convert value of type {from} to {to} for {unit}")]
    ConversionInfeasible {
        unit: String,
        from: TypeClass,
        to: TypeClass,
    },

    #[error("conversion to {to} failed for {unit}: {source}")]
    Conversion {
        unit: String,
        to: TypeClass,
        #[source]
        source: ConversionError,
    },

    #[error("failed to decode envelope payload to {target} for {unit}: {source}")]
    EnvelopeDecode {
        unit: String,
        target: TypeClass,
        #[source]
        source: ConversionError,
    },

    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("upstream error: {0}")]
    Upstream(String),
}

impl AdapterError {
    /// True for every arity-related contract violation.
    pub fn is_arity_mismatch(&self) -> bool {
        matches!(
            self,
            Self::ArityMismatch { .. }
                | Self::NotComposite { .. }
                | Self::SlotOutOfRange { .. }
                | Self::InvalidComposite { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infeasible_message_names_both_classes_and_unit() {
        let err = AdapterError::ConversionInfeasible {
            unit: "[uppercase]".to_string(),
            from: TypeClass::Bool,
            to: TypeClass::named("Order"),
        };
        let msg = err.to_string();
        assert!(msg.contains("bool"));
        assert!(msg.contains("Order"));
        assert!(msg.contains("[uppercase]"));
    }

    #[test]
    fn arity_classification() {
        assert!(AdapterError::NotComposite { unit: "[f]".into() }.is_arity_mismatch());
        assert!(AdapterError::InvalidComposite { arity: 9 }.is_arity_mismatch());
        assert!(!AdapterError::Upstream("boom".into()).is_arity_mismatch());
    }

    #[test]
    fn envelope_decode_exposes_source() {
        use std::error::Error;
        let err = AdapterError::EnvelopeDecode {
            unit: "[f]".into(),
            target: TypeClass::Int,
            source: ConversionError::Unsupported {
                from: TypeClass::Bool,
                to: TypeClass::Int,
            },
        };
        assert!(err.source().is_some());
    }
}
