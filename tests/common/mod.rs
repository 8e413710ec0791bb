//! Shared helpers for adapter integration tests
//!
//! Collaborators here wrap the defaults and count every call, so tests can
//! assert how often (and whether) the adapter reaches for them.

use fninput::{
    ContentTypeEnvelopeConverter, ConversionError, ConversionService, DeclaredType,
    DefaultConversionService, Envelope, EnvelopeConverter, InputAdapter, InputDescriptor,
    TypeClass, Value,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Conversion service that counts `can_convert` and `convert` calls.
#[derive(Default)]
pub struct CountingConversionService {
    inner: DefaultConversionService,
    checks: AtomicUsize,
    conversions: AtomicUsize,
}

impl CountingConversionService {
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn conversions(&self) -> usize {
        self.conversions.load(Ordering::SeqCst)
    }
}

impl ConversionService for CountingConversionService {
    fn can_convert(&self, from: &TypeClass, to: &TypeClass) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.inner.can_convert(from, to)
    }

    fn convert(&self, value: Value, to: &TypeClass) -> Result<Value, ConversionError> {
        self.conversions.fetch_add(1, Ordering::SeqCst);
        self.inner.convert(value, to)
    }
}

/// Envelope converter that counts `from_envelope` calls.
#[derive(Default)]
pub struct CountingEnvelopeConverter {
    inner: ContentTypeEnvelopeConverter,
    calls: AtomicUsize,
}

impl CountingEnvelopeConverter {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EnvelopeConverter for CountingEnvelopeConverter {
    fn from_envelope(&self, envelope: &Envelope, target: &TypeClass) -> Result<Value, ConversionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.from_envelope(envelope, target)
    }
}

/// An adapter for a unit named `name` plus handles on its counting collaborators.
pub struct Harness {
    pub adapter: InputAdapter,
    pub conversion: Arc<CountingConversionService>,
    pub envelopes: Arc<CountingEnvelopeConverter>,
}

pub fn harness(name: &str, input: DeclaredType) -> Harness {
    let descriptor = InputDescriptor::named(name, input).expect("valid descriptor");
    let conversion = Arc::new(CountingConversionService::default());
    let envelopes = Arc::new(CountingEnvelopeConverter::default());
    let adapter = InputAdapter::new(Arc::new(descriptor), conversion.clone(), envelopes.clone());
    Harness {
        adapter,
        conversion,
        envelopes,
    }
}

pub fn class(c: TypeClass) -> DeclaredType {
    DeclaredType::class(c)
}
