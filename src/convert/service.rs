//! Value conversion service
//!
//! The adapter asks `can_convert` before it ever calls `convert`, so an
//! implementation only has to produce values for pairs it claims to support.

use super::error::ConversionError;
use crate::value::{TypeClass, Value};
use serde_json::Number;

/// Pluggable class-to-class value conversion.
pub trait ConversionService: Send + Sync {
    /// Whether values of class `from` can be converted to class `to`.
    fn can_convert(&self, from: &TypeClass, to: &TypeClass) -> bool;

    /// Convert `value` to class `to`.
    fn convert(&self, value: Value, to: &TypeClass) -> Result<Value, ConversionError>;
}

/// Scalar, text, bytes and JSON conversions.
///
/// | from            | to                                 |
/// |-----------------|------------------------------------|
/// | text            | int, float, bool, bytes, json, named |
/// | bytes           | text, json, named                  |
/// | int             | float, text, json                  |
/// | float           | int (integral only), text, json    |
/// | bool            | text, json                         |
/// | json            | bool, int, float, text, bytes, named |
/// | named           | json, text                         |
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConversionService;

impl ConversionService for DefaultConversionService {
    fn can_convert(&self, from: &TypeClass, to: &TypeClass) -> bool {
        use TypeClass::*;
        if from.is_assignable_to(to) {
            return true;
        }
        matches!(
            (from, to),
            (Text, Int | Float | Bool | Bytes | Json | Named(_))
                | (Bytes, Text | Json | Named(_))
                | (Int, Float | Text | Json)
                | (Float, Int | Text | Json)
                | (Bool, Text | Json)
                | (Json, Bool | Int | Float | Text | Bytes | Named(_))
                | (Named(_), Json | Text)
        )
    }

    fn convert(&self, value: Value, to: &TypeClass) -> Result<Value, ConversionError> {
        if value.is_assignable_to(to) {
            return Ok(value);
        }
        match (value, to) {
            (Value::Text(s), TypeClass::Int) => parse_int(&s),
            (Value::Text(s), TypeClass::Float) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| ConversionError::Parse {
                    target: TypeClass::Float,
                    input: s,
                }),
            (Value::Text(s), TypeClass::Bool) => parse_bool(&s),
            (Value::Text(s), TypeClass::Bytes) => Ok(Value::Bytes(s.into_bytes())),
            (Value::Text(s), target @ (TypeClass::Json | TypeClass::Named(_))) => {
                json_into_class(serde_json::from_str(&s)?, target)
            }
            (Value::Bytes(b), TypeClass::Text) => Ok(Value::Text(String::from_utf8(b)?)),
            (Value::Bytes(b), target @ (TypeClass::Json | TypeClass::Named(_))) => {
                json_into_class(serde_json::from_slice(&b)?, target)
            }
            (Value::Int(i), TypeClass::Float) => Ok(Value::Float(i as f64)),
            (Value::Int(i), TypeClass::Text) => Ok(Value::Text(i.to_string())),
            (Value::Int(i), TypeClass::Json) => Ok(Value::Json(i.into())),
            (Value::Float(f), TypeClass::Int) => float_to_int(f),
            (Value::Float(f), TypeClass::Text) => Ok(Value::Text(f.to_string())),
            (Value::Float(f), TypeClass::Json) => Number::from_f64(f)
                .map(|n| Value::Json(serde_json::Value::Number(n)))
                .ok_or(ConversionError::OutOfRange {
                    target: TypeClass::Json,
                    value: f.to_string(),
                }),
            (Value::Bool(b), TypeClass::Text) => Ok(Value::Text(b.to_string())),
            (Value::Bool(b), TypeClass::Json) => Ok(Value::Json(b.into())),
            (Value::Json(j), TypeClass::Bytes) => Ok(Value::Bytes(serde_json::to_vec(&j)?)),
            (Value::Json(j), target) => json_into_class(j, target),
            (Value::Record { fields, .. }, TypeClass::Json) => {
                Ok(Value::Json(serde_json::Value::Object(fields)))
            }
            (Value::Record { fields, .. }, TypeClass::Text) => Ok(Value::Text(
                serde_json::to_string(&serde_json::Value::Object(fields))?,
            )),
            (value, to) => Err(ConversionError::Unsupported {
                from: value.class(),
                to: to.clone(),
            }),
        }
    }
}

fn parse_int(s: &str) -> Result<Value, ConversionError> {
    s.trim()
        .parse::<i64>()
        .map(Value::Int)
        .map_err(|_| ConversionError::Parse {
            target: TypeClass::Int,
            input: s.to_string(),
        })
}

fn parse_bool(s: &str) -> Result<Value, ConversionError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
        "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
        _ => Err(ConversionError::Parse {
            target: TypeClass::Bool,
            input: s.to_string(),
        }),
    }
}

fn float_to_int(f: f64) -> Result<Value, ConversionError> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Ok(Value::Int(f as i64))
    } else {
        Err(ConversionError::OutOfRange {
            target: TypeClass::Int,
            value: f.to_string(),
        })
    }
}

/// Coerce a decoded JSON document into `target`.
pub(crate) fn json_into_class(
    json: serde_json::Value,
    target: &TypeClass,
) -> Result<Value, ConversionError> {
    let shape_error = |json: &serde_json::Value| ConversionError::Shape {
        target: target.clone(),
        value: json.to_string(),
    };
    match target {
        TypeClass::Any => Ok(Value::from_json(json)),
        TypeClass::Json => Ok(Value::Json(json)),
        TypeClass::Bool => json.as_bool().map(Value::Bool).ok_or_else(|| shape_error(&json)),
        TypeClass::Int => json.as_i64().map(Value::Int).ok_or_else(|| shape_error(&json)),
        TypeClass::Float => json.as_f64().map(Value::Float).ok_or_else(|| shape_error(&json)),
        TypeClass::Text => match json {
            serde_json::Value::String(s) => Ok(Value::Text(s)),
            other => Ok(Value::Text(other.to_string())),
        },
        TypeClass::Named(class) => match json {
            serde_json::Value::Object(fields) => Ok(Value::record(class.clone(), fields)),
            other => Err(shape_error(&other)),
        },
        TypeClass::Void | TypeClass::Bytes | TypeClass::Envelope => Err(ConversionError::Unsupported {
            from: TypeClass::Json,
            to: target.clone(),
        }),
    }
}
