//! Runtime value classes
//!
//! A `TypeClass` is the raw class a declared type resolves to once stream and
//! envelope wrappers are removed. Conversion is always measured against one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The raw class of a runtime value or of a declared target slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeClass {
    /// Discard sentinel: the unit takes no interest in the value
    Void,
    /// Accepts every value unchanged
    Any,
    Bool,
    Int,
    Float,
    Text,
    Bytes,
    Json,
    Envelope,
    /// Application-defined record class (e.g. "Order")
    Named(String),
}

impl TypeClass {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// Whether a value of class `self` can be handed to a slot of class
    /// `target` without any conversion.
    pub fn is_assignable_to(&self, target: &TypeClass) -> bool {
        matches!(target, Self::Any) || self == target
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Void => "void",
            Self::Any => "any",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Json => "json",
            Self::Envelope => "envelope",
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
