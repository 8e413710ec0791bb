//! Runtime values handed to and produced by the input adapter

mod class;
mod envelope;

pub use class::TypeClass;
pub use envelope::{Envelope, EnvelopeBuilder, Headers, CONTENT_TYPE};

use serde_json::{Map, Number};

/// A dynamically typed runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    /// Instance of an application-defined record class
    Record {
        class: String,
        fields: Map<String, serde_json::Value>,
    },
    Envelope(Envelope),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn record(class: impl Into<String>, fields: Map<String, serde_json::Value>) -> Self {
        Self::Record {
            class: class.into(),
            fields,
        }
    }

    /// The runtime class of this value. `Null` reports `Void`.
    pub fn class(&self) -> TypeClass {
        match self {
            Self::Null => TypeClass::Void,
            Self::Bool(_) => TypeClass::Bool,
            Self::Int(_) => TypeClass::Int,
            Self::Float(_) => TypeClass::Float,
            Self::Text(_) => TypeClass::Text,
            Self::Bytes(_) => TypeClass::Bytes,
            Self::Json(_) => TypeClass::Json,
            Self::Record { class, .. } => TypeClass::Named(class.clone()),
            Self::Envelope(_) => TypeClass::Envelope,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this value can be passed to a slot of class `target` as-is.
    ///
    /// `Null` is assignable everywhere and is never converted.
    pub fn is_assignable_to(&self, target: &TypeClass) -> bool {
        self.is_null() || self.class().is_assignable_to(target)
    }

    pub fn as_envelope(&self) -> Option<&Envelope> {
        match self {
            Self::Envelope(env) => Some(env),
            _ => None,
        }
    }

    /// Map a JSON document onto the closest native value.
    ///
    /// Scalars become their native variants; arrays and objects stay `Json`.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::Text(s),
            other => Self::Json(other),
        }
    }

    /// Render this value as JSON for display or transport.
    ///
    /// Bytes render as an array of numbers; envelopes as
    /// `{"headers": .., "payload": ..}`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::Number((*i).into()),
            Self::Float(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Bytes(b) => serde_json::Value::Array(
                b.iter().map(|byte| serde_json::Value::Number((*byte).into())).collect(),
            ),
            Self::Json(j) => j.clone(),
            Self::Record { fields, .. } => serde_json::Value::Object(fields.clone()),
            Self::Envelope(env) => {
                let mut obj = Map::new();
                obj.insert(
                    "headers".to_string(),
                    serde_json::Value::Object(
                        env.headers().iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                    ),
                );
                obj.insert("payload".to_string(), env.payload().to_json());
                serde_json::Value::Object(obj)
            }
        }
    }
}

impl From<Envelope> for Value {
    fn from(env: Envelope) -> Self {
        Self::Envelope(env)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
