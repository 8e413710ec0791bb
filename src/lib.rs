//! fninput: input argument adaptation for function invocation
//!
//! Coerces the value arriving at a callable unit's input into the exact
//! types the unit declares, across four axes:
//!
//! - **Arity**: one argument or a composite of 2–8 positional arguments
//! - **Synchronicity**: a plain value or a lazily converted stream
//! - **Envelope**: a bare payload or a payload carried with headers
//! - **Representation**: runtime class differs from the declared class
//!
//! # Example
//!
//! ```
//! use fninput::{DeclaredType, InputAdapter, InputDescriptor, InputValue, TypeClass, Value};
//! use std::sync::Arc;
//!
//! let descriptor = InputDescriptor::named("square", DeclaredType::class(TypeClass::Int)).unwrap();
//! let adapter = InputAdapter::with_defaults(Arc::new(descriptor));
//!
//! let converted = adapter.convert(InputValue::scalar("12")).unwrap();
//! assert_eq!(converted.into_scalar(), Some(Value::Int(12)));
//! ```

pub mod adapter;
pub mod config;
pub mod convert;
pub mod descriptor;
pub mod value;

pub use adapter::{AdapterError, Composite, InputAdapter, InputValue, ValueStream};
pub use config::{AdapterConfig, ConfigError};
pub use convert::{
    ContentTypeEnvelopeConverter, ConversionError, ConversionService, DefaultConversionService,
    EnvelopeConverter,
};
pub use descriptor::{DeclaredType, InputDescriptor, StreamKind};
pub use value::{Envelope, EnvelopeBuilder, Headers, TypeClass, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
