//! Invocation-time input shapes
//!
//! An input is a plain value, a composite of positional arguments, or an
//! asynchronous stream producing one or many values. The adapter returns the
//! same shape it was given.

use super::error::AdapterError;
use crate::descriptor::{MAX_ARITY, MIN_ARITY};
use crate::value::Value;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::fmt;

/// A lazily consumed stream of values. Errors travel in-band.
pub type ValueStream = BoxStream<'static, Result<Value, AdapterError>>;

/// The value handed to (and returned from) an input adapter.
pub enum InputValue {
    Scalar(Value),
    Composite(Composite),
    /// Stream producing at most one value
    SingleStream(ValueStream),
    /// Stream producing any number of values
    MultiStream(ValueStream),
}

impl InputValue {
    pub fn scalar(value: impl Into<Value>) -> Self {
        Self::Scalar(value.into())
    }

    /// Composite input from 2–8 positional elements.
    pub fn composite(elements: Vec<InputValue>) -> Result<Self, AdapterError> {
        Ok(Self::Composite(Composite::new(elements)?))
    }

    /// Single-value stream that yields `value` once polled.
    pub fn single(value: Value) -> Self {
        Self::SingleStream(stream::once(async move { Ok(value) }).boxed())
    }

    /// Multi-value stream over `stream`.
    pub fn many<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Value, AdapterError>> + Send + 'static,
    {
        Self::MultiStream(stream.boxed())
    }

    /// Multi-value stream over an in-memory list.
    pub fn from_values(values: Vec<Value>) -> Self {
        Self::many(stream::iter(values.into_iter().map(Ok)))
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Self::SingleStream(_) | Self::MultiStream(_))
    }

    /// Name of the variant, for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Composite(_) => "composite",
            Self::SingleStream(_) => "single-value stream",
            Self::MultiStream(_) => "multi-value stream",
        }
    }

    pub fn into_scalar(self) -> Option<Value> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_composite(self) -> Option<Composite> {
        match self {
            Self::Composite(composite) => Some(composite),
            _ => None,
        }
    }

    /// The underlying stream of either stream variant.
    pub fn into_stream(self) -> Option<ValueStream> {
        match self {
            Self::SingleStream(s) | Self::MultiStream(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            Self::Composite(composite) => f.debug_tuple("Composite").field(composite).finish(),
            Self::SingleStream(_) => f.write_str("SingleStream(..)"),
            Self::MultiStream(_) => f.write_str("MultiStream(..)"),
        }
    }
}

impl From<Value> for InputValue {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

/// An ordered bundle of 2–8 positional arguments.
#[derive(Debug)]
pub struct Composite {
    elements: Vec<InputValue>,
}

impl Composite {
    /// Decompose positional elements into a composite, validating arity.
    pub fn new(elements: Vec<InputValue>) -> Result<Self, AdapterError> {
        if !(MIN_ARITY..=MAX_ARITY).contains(&elements.len()) {
            return Err(AdapterError::InvalidComposite {
                arity: elements.len(),
            });
        }
        Ok(Self { elements })
    }

    pub fn arity(&self) -> usize {
        self.elements.len()
    }

    pub fn into_elements(self) -> Vec<InputValue> {
        self.elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_rejects_out_of_range_arity() {
        let one = Composite::new(vec![InputValue::scalar(1i64)]);
        assert!(matches!(one, Err(AdapterError::InvalidComposite { arity: 1 })));

        let nine = Composite::new((0..9i64).map(InputValue::scalar).collect());
        assert!(matches!(nine, Err(AdapterError::InvalidComposite { arity: 9 })));
    }

    #[test]
    fn composite_preserves_order() {
        let composite = Composite::new((0..4i64).map(InputValue::scalar).collect()).unwrap();
        assert_eq!(composite.arity(), 4);
        let values: Vec<Value> = composite
            .into_elements()
            .into_iter()
            .filter_map(InputValue::into_scalar)
            .collect();
        assert_eq!(values, vec![Value::Int(0), Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[tokio::test]
    async fn single_stream_yields_once() {
        let stream = InputValue::single(Value::Int(9)).into_stream().unwrap();
        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap(), &Value::Int(9));
    }

    #[test]
    fn debug_does_not_poll_streams() {
        let input = InputValue::from_values(vec![Value::Int(1)]);
        assert_eq!(format!("{:?}", input), "MultiStream(..)");
        assert!(input.is_stream());
        assert_eq!(input.shape(), "multi-value stream");
    }
}
