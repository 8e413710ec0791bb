//! Envelope: a payload travelling with a metadata (header) mapping

use super::Value;
use std::collections::BTreeMap;

/// Header carrying the payload's media type.
pub const CONTENT_TYPE: &str = "contentType";

/// Open-ended envelope metadata.
pub type Headers = BTreeMap<String, serde_json::Value>;

/// A payload paired with headers.
///
/// Envelopes are values: rebuilding one around a converted payload always
/// copies the headers, so the original envelope is never affected.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    payload: Box<Value>,
    headers: Headers,
}

impl Envelope {
    /// Envelope with no headers.
    pub fn new(payload: Value) -> Self {
        Self {
            payload: Box::new(payload),
            headers: Headers::new(),
        }
    }

    pub fn builder(payload: Value) -> EnvelopeBuilder {
        EnvelopeBuilder::with_payload(payload)
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, key: &str) -> Option<&serde_json::Value> {
        self.headers.get(key)
    }

    /// The `contentType` header, if present and a string.
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE).and_then(|v| v.as_str())
    }
}

/// Builds an [`Envelope`] from a payload plus copied headers.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    payload: Value,
    headers: Headers,
}

impl EnvelopeBuilder {
    pub fn with_payload(payload: Value) -> Self {
        Self {
            payload,
            headers: Headers::new(),
        }
    }

    /// Copy every entry of `headers` into the envelope being built.
    pub fn copy_headers(mut self, headers: &Headers) -> Self {
        self.headers
            .extend(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn content_type(self, content_type: &str) -> Self {
        self.header(CONTENT_TYPE, content_type)
    }

    pub fn build(self) -> Envelope {
        Envelope {
            payload: Box::new(self.payload),
            headers: self.headers,
        }
    }
}
