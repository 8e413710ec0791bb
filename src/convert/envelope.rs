//! Envelope payload decoding
//!
//! Payloads travelling in envelopes are usually serialized. The converter
//! picks a decoding from the envelope's `contentType` header before coercing
//! the result into the requested class.

use super::error::ConversionError;
use super::service::{json_into_class, ConversionService, DefaultConversionService};
use crate::value::{Envelope, TypeClass, Value};
use std::sync::Arc;

/// Content type assumed when an envelope carries none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Decodes an envelope's payload into a target class.
pub trait EnvelopeConverter: Send + Sync {
    fn from_envelope(&self, envelope: &Envelope, target: &TypeClass) -> Result<Value, ConversionError>;
}

/// Content-type driven envelope converter.
///
/// - `application/json` and `*+json`: text or bytes payloads are parsed as
///   JSON and coerced into the target class
/// - `text/*`: bytes payloads are decoded as UTF-8, then converted
/// - anything else: the payload goes to the conversion service as-is
#[derive(Clone)]
pub struct ContentTypeEnvelopeConverter {
    conversion: Arc<dyn ConversionService>,
}

impl ContentTypeEnvelopeConverter {
    pub fn new(conversion: Arc<dyn ConversionService>) -> Self {
        Self { conversion }
    }

    fn delegate(&self, payload: Value, target: &TypeClass) -> Result<Value, ConversionError> {
        if payload.is_assignable_to(target) {
            return Ok(payload);
        }
        let from = payload.class();
        if !self.conversion.can_convert(&from, target) {
            return Err(ConversionError::Unsupported {
                from,
                to: target.clone(),
            });
        }
        self.conversion.convert(payload, target)
    }
}

impl Default for ContentTypeEnvelopeConverter {
    fn default() -> Self {
        Self::new(Arc::new(DefaultConversionService))
    }
}

impl EnvelopeConverter for ContentTypeEnvelopeConverter {
    fn from_envelope(&self, envelope: &Envelope, target: &TypeClass) -> Result<Value, ConversionError> {
        let payload = envelope.payload();
        if payload.is_assignable_to(target) {
            return Ok(payload.clone());
        }

        let mime = media_type(envelope.content_type().unwrap_or(DEFAULT_CONTENT_TYPE));
        if is_json(&mime) {
            match payload {
                Value::Bytes(bytes) => json_into_class(serde_json::from_slice(bytes)?, target),
                Value::Text(text) => json_into_class(serde_json::from_str(text)?, target),
                other => self.delegate(other.clone(), target),
            }
        } else if mime.starts_with("text/") {
            let text = match payload {
                Value::Bytes(bytes) => Value::Text(String::from_utf8(bytes.clone())?),
                other => other.clone(),
            };
            self.delegate(text, target)
        } else {
            self.delegate(payload.clone(), target)
        }
    }
}

/// Lower-cased media type without parameters (`text/plain; charset=utf-8` -> `text/plain`).
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_json(mime: &str) -> bool {
    mime == "application/json" || mime.ends_with("+json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn converter() -> ContentTypeEnvelopeConverter {
        ContentTypeEnvelopeConverter::default()
    }

    #[test]
    fn json_bytes_decode_into_record() {
        let env = Envelope::builder(Value::Bytes(br#"{"sku":"A-1","qty":2}"#.to_vec()))
            .content_type("application/json")
            .build();

        let value = converter().from_envelope(&env, &TypeClass::named("Order")).unwrap();
        assert_eq!(value.class(), TypeClass::named("Order"));
        assert_eq!(value.to_json(), json!({"sku": "A-1", "qty": 2}));
    }

    #[test]
    fn missing_content_type_defaults_to_json() {
        let env = Envelope::new(Value::text("17"));
        assert_eq!(
            converter().from_envelope(&env, &TypeClass::Int).unwrap(),
            Value::Int(17)
        );
    }

    #[test]
    fn vendor_json_suffix_is_json() {
        let env = Envelope::builder(Value::text("true"))
            .content_type("application/vnd.orders+json; charset=utf-8")
            .build();
        assert_eq!(
            converter().from_envelope(&env, &TypeClass::Bool).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn text_payload_decodes_then_converts() {
        let env = Envelope::builder(Value::Bytes(b" 12 ".to_vec()))
            .content_type("text/plain")
            .build();
        assert_eq!(
            converter().from_envelope(&env, &TypeClass::Int).unwrap(),
            Value::Int(12)
        );
        assert_eq!(
            converter().from_envelope(&env, &TypeClass::Text).unwrap(),
            Value::text(" 12 ")
        );
    }

    #[test]
    fn malformed_json_fails_to_decode() {
        let env = Envelope::builder(Value::Bytes(b"{not json".to_vec()))
            .content_type("application/json")
            .build();
        assert!(matches!(
            converter().from_envelope(&env, &TypeClass::Json),
            Err(ConversionError::Decode(_))
        ));
    }

    #[test]
    fn assignable_payload_returned_as_is() {
        let env = Envelope::builder(Value::Int(3)).content_type("text/plain").build();
        assert_eq!(
            converter().from_envelope(&env, &TypeClass::Int).unwrap(),
            Value::Int(3)
        );
    }

    #[test]
    fn unknown_media_type_without_conversion_fails() {
        let env = Envelope::builder(Value::Bool(true))
            .content_type("application/octet-stream")
            .build();
        assert!(matches!(
            converter().from_envelope(&env, &TypeClass::Int),
            Err(ConversionError::Unsupported { .. })
        ));
    }
}
