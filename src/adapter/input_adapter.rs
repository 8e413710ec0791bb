//! InputAdapter — coerces invocation input into a unit's declared types
//!
//! Conversion runs in layers: composite decomposition, then per-slot
//! stream handling, then envelope handling, then plain value conversion.
//! Streams are never polled here; a lazy per-element mapping is installed
//! and runs wherever the stream is eventually consumed.

use super::error::AdapterError;
use super::input::{Composite, InputValue, ValueStream};
use crate::config::AdapterConfig;
use crate::convert::{
    ContentTypeEnvelopeConverter, ConversionService, DefaultConversionService, EnvelopeConverter,
};
use crate::descriptor::{DeclaredType, InputDescriptor};
use crate::value::{Envelope, TypeClass, Value};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, trace};

/// What one slot converts to, resolved from its declared type.
#[derive(Debug, Clone)]
struct SlotTarget {
    /// Class left after removing the stream or envelope wrapper
    effective: TypeClass,
    /// Whether converted envelopes are rebuilt rather than unwrapped
    envelope: bool,
}

impl SlotTarget {
    fn resolve(declared: &DeclaredType) -> Self {
        Self {
            effective: declared.effective_class(),
            envelope: declared.expects_envelope(),
        }
    }
}

/// The collaborators a conversion needs, cheap to clone into stream mappings.
#[derive(Clone)]
struct Converters {
    unit: Arc<str>,
    conversion: Arc<dyn ConversionService>,
    envelopes: Arc<dyn EnvelopeConverter>,
}

impl Converters {
    /// Convert one concrete (non-stream) value for `target`.
    fn convert_value(&self, value: Value, target: &SlotTarget) -> Result<Value, AdapterError> {
        if target.effective.is_void() {
            trace!(unit = %self.unit, "void target, discarding value");
            return Ok(Value::Null);
        }
        match value {
            Value::Envelope(envelope) if target.effective == TypeClass::Envelope => {
                Ok(Value::Envelope(envelope))
            }
            Value::Envelope(envelope) if target.envelope => {
                self.envelope_to_envelope(envelope, &target.effective)
            }
            Value::Envelope(envelope) => self.envelope_payload(&envelope, &target.effective),
            plain => self.convert_plain(plain, &target.effective),
        }
    }

    fn convert_plain(&self, value: Value, target: &TypeClass) -> Result<Value, AdapterError> {
        if value.is_assignable_to(target) {
            return Ok(value);
        }
        let from = value.class();
        if !self.conversion.can_convert(&from, target) {
            return Err(AdapterError::ConversionInfeasible {
                unit: self.unit.to_string(),
                from,
                to: target.clone(),
            });
        }
        debug!(unit = %self.unit, from = %from, to = %target, "converting value");
        self.conversion
            .convert(value, target)
            .map_err(|source| AdapterError::Conversion {
                unit: self.unit.to_string(),
                to: target.clone(),
                source,
            })
    }

    /// The envelope's payload as `target`, decoding only when needed.
    fn envelope_payload(&self, envelope: &Envelope, target: &TypeClass) -> Result<Value, AdapterError> {
        let payload = envelope.payload();
        if payload.is_assignable_to(target) {
            return Ok(payload.clone());
        }
        debug!(
            unit = %self.unit,
            payload = %payload.class(),
            to = %target,
            "converting envelope payload to value"
        );
        self.envelopes
            .from_envelope(envelope, target)
            .map_err(|source| AdapterError::EnvelopeDecode {
                unit: self.unit.to_string(),
                target: target.clone(),
                source,
            })
    }

    /// Rebuild the envelope around a converted payload with copied headers.
    fn envelope_to_envelope(&self, envelope: Envelope, target: &TypeClass) -> Result<Value, AdapterError> {
        debug!(
            unit = %self.unit,
            payload = %envelope.payload().class(),
            to = %target,
            "converting envelope to envelope"
        );
        let payload = self.envelope_payload(&envelope, target)?;
        Ok(Value::Envelope(
            Envelope::builder(payload)
                .copy_headers(envelope.headers())
                .build(),
        ))
    }
}

/// Adapts invocation input to one unit's declared input.
///
/// Bound to a single descriptor for its lifetime. Holds no per-invocation
/// state, so one instance may serve concurrent invocations.
#[derive(Clone)]
pub struct InputAdapter {
    descriptor: Arc<InputDescriptor>,
    converters: Converters,
    config: AdapterConfig,
}

impl InputAdapter {
    pub fn new(
        descriptor: Arc<InputDescriptor>,
        conversion: Arc<dyn ConversionService>,
        envelopes: Arc<dyn EnvelopeConverter>,
    ) -> Self {
        let unit: Arc<str> = descriptor.unit_label().into();
        Self {
            descriptor,
            converters: Converters {
                unit,
                conversion,
                envelopes,
            },
            config: AdapterConfig::default(),
        }
    }

    /// Adapter using [`DefaultConversionService`] and a
    /// [`ContentTypeEnvelopeConverter`] backed by it.
    pub fn with_defaults(descriptor: Arc<InputDescriptor>) -> Self {
        let conversion: Arc<dyn ConversionService> = Arc::new(DefaultConversionService);
        let envelopes = Arc::new(ContentTypeEnvelopeConverter::new(conversion.clone()));
        Self::new(descriptor, conversion, envelopes)
    }

    pub fn with_config(mut self, config: AdapterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn descriptor(&self) -> &InputDescriptor {
        &self.descriptor
    }

    /// The unit's name followed by its aliases.
    pub fn unit_names(&self) -> &[String] {
        self.descriptor.names()
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Convert `input` into the shape and types the unit declares.
    ///
    /// A composite input converts its first and last elements against the
    /// matching slots; elements in between pass through untouched unless
    /// `convert_all_composite_elements` is configured. Anything else is
    /// converted against slot 0.
    pub fn convert(&self, input: InputValue) -> Result<InputValue, AdapterError> {
        match input {
            InputValue::Composite(composite) => self.convert_composite(composite),
            other => self.convert_slot(other, self.input_argument_type(0)?),
        }
    }

    /// Number of declared arguments. Only defined for composite inputs.
    pub fn input_argument_count(&self) -> Result<usize, AdapterError> {
        self.descriptor.arity().ok_or_else(|| self.not_composite())
    }

    /// Raw class of composite slot `index`, wrappers removed.
    pub fn input_argument_raw_type(&self, index: usize) -> Result<TypeClass, AdapterError> {
        let slots = self.descriptor.slots().ok_or_else(|| self.not_composite())?;
        slots
            .get(index)
            .map(DeclaredType::effective_class)
            .ok_or_else(|| self.out_of_range(index, slots.len()))
    }

    /// Declared type of slot `index`.
    ///
    /// A simple descriptor has exactly one slot, so `index` is ignored and
    /// the whole declared input is returned.
    pub fn input_argument_type(&self, index: usize) -> Result<&DeclaredType, AdapterError> {
        match self.descriptor.input() {
            DeclaredType::Composite(slots) => slots
                .get(index)
                .ok_or_else(|| self.out_of_range(index, slots.len())),
            simple => Ok(simple),
        }
    }

    fn convert_composite(&self, composite: Composite) -> Result<InputValue, AdapterError> {
        let arity = composite.arity();
        if let Some(expected) = self.descriptor.arity() {
            if expected != arity {
                return Err(AdapterError::ArityMismatch {
                    unit: self.unit(),
                    expected,
                    actual: arity,
                });
            }
        }

        let last = arity - 1;
        let convert_all = self.config.convert_all_composite_elements;
        let converted = composite
            .into_elements()
            .into_iter()
            .enumerate()
            .map(|(index, element)| {
                if index == 0 || index == last || convert_all {
                    self.convert_slot(element, self.input_argument_type(index)?)
                } else {
                    trace!(unit = %self.converters.unit, slot = index, "composite element passed through");
                    Ok(element)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        InputValue::composite(converted)
    }

    /// Convert one slot's value, installing a lazy mapping over streams.
    fn convert_slot(&self, value: InputValue, declared: &DeclaredType) -> Result<InputValue, AdapterError> {
        let target = SlotTarget::resolve(declared);
        match value {
            InputValue::Scalar(v) => {
                if declared.is_stream() {
                    return Err(self.illegal_synchronicity(format!(
                        "invoking reactive function as imperative is not allowed (declared {}, received {})",
                        declared.describe(),
                        v.class()
                    )));
                }
                Ok(InputValue::Scalar(self.converters.convert_value(v, &target)?))
            }
            InputValue::SingleStream(stream) => {
                Ok(InputValue::SingleStream(self.map_stream(stream, declared, target)?))
            }
            InputValue::MultiStream(stream) => {
                Ok(InputValue::MultiStream(self.map_stream(stream, declared, target)?))
            }
            InputValue::Composite(nested) => Err(AdapterError::ArityMismatch {
                unit: self.unit(),
                expected: 1,
                actual: nested.arity(),
            }),
        }
    }

    fn map_stream(
        &self,
        stream: ValueStream,
        declared: &DeclaredType,
        target: SlotTarget,
    ) -> Result<ValueStream, AdapterError> {
        if self.config.strict_synchronicity && !declared.is_stream() {
            return Err(self.illegal_synchronicity(format!(
                "stream received for imperative input {}",
                declared.describe()
            )));
        }
        if target.effective.is_void() {
            debug!(unit = %self.converters.unit, "void stream target, passing stream through");
            return Ok(stream);
        }
        let converters = self.converters.clone();
        Ok(stream
            .map(move |item| item.and_then(|value| converters.convert_value(value, &target)))
            .boxed())
    }

    fn unit(&self) -> String {
        self.converters.unit.to_string()
    }

    fn not_composite(&self) -> AdapterError {
        AdapterError::NotComposite { unit: self.unit() }
    }

    fn out_of_range(&self, index: usize, slots: usize) -> AdapterError {
        AdapterError::SlotOutOfRange {
            unit: self.unit(),
            index,
            slots,
        }
    }

    fn illegal_synchronicity(&self, detail: String) -> AdapterError {
        AdapterError::IllegalSynchronicity {
            unit: self.unit(),
            detail,
        }
    }
}
