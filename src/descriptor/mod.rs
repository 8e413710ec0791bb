//! Declared input types of a callable unit
//!
//! A descriptor is built once when a unit is registered and handed to the
//! adapter as plain immutable data. Nothing here inspects runtime values.

use crate::adapter::AdapterError;
use crate::config::ConfigError;
use crate::value::TypeClass;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Smallest composite arity.
pub const MIN_ARITY: usize = 2;
/// Largest composite arity.
pub const MAX_ARITY: usize = 8;

/// Cardinality of an asynchronous stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    /// Produces at most one value
    Single,
    /// Produces any number of values
    Many,
}

/// The declared type of one target slot, or of a unit's whole input.
///
/// In YAML:
///
/// ```yaml
/// composite:
///   - class: int
///   - envelope: { class: { named: Order } }
///   - stream: { kind: many, item: { class: text } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    Class(TypeClass),
    Envelope(Box<DeclaredType>),
    Stream {
        kind: StreamKind,
        item: Box<DeclaredType>,
    },
    Composite(Vec<DeclaredType>),
}

impl DeclaredType {
    pub fn class(class: TypeClass) -> Self {
        Self::Class(class)
    }

    pub fn envelope(payload: DeclaredType) -> Self {
        Self::Envelope(Box::new(payload))
    }

    /// Multi-value stream of `item`.
    pub fn stream(item: DeclaredType) -> Self {
        Self::Stream {
            kind: StreamKind::Many,
            item: Box::new(item),
        }
    }

    /// Single-value stream of `item`.
    pub fn single(item: DeclaredType) -> Self {
        Self::Stream {
            kind: StreamKind::Single,
            item: Box::new(item),
        }
    }

    pub fn composite(slots: Vec<DeclaredType>) -> Self {
        Self::Composite(slots)
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream { .. })
    }

    pub fn is_envelope(&self) -> bool {
        matches!(self, Self::Envelope(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }

    pub fn stream_kind(&self) -> Option<StreamKind> {
        match self {
            Self::Stream { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Remove one stream layer, if any.
    pub fn unwrap_stream(&self) -> &DeclaredType {
        match self {
            Self::Stream { item, .. } => item,
            other => other,
        }
    }

    /// Whether the slot expects envelopes, looking through one stream layer.
    pub fn expects_envelope(&self) -> bool {
        self.unwrap_stream().is_envelope()
    }

    /// The class conversion is measured against.
    ///
    /// One stream layer is removed first; otherwise one envelope layer. An
    /// envelope left inside a stream is looked through as well. Composites
    /// have no single class and resolve to `Any`.
    pub fn effective_class(&self) -> TypeClass {
        let unwrapped = match self {
            Self::Stream { item, .. } => item.as_ref(),
            Self::Envelope(payload) => payload.as_ref(),
            other => other,
        };
        match unwrapped {
            Self::Class(class) => class.clone(),
            Self::Envelope(payload) => payload.effective_class(),
            Self::Stream { .. } | Self::Composite(_) => TypeClass::Any,
        }
    }

    fn validate_slot(&self) -> Result<(), String> {
        match self {
            Self::Class(_) => Ok(()),
            Self::Envelope(payload) => match payload.as_ref() {
                Self::Class(_) => Ok(()),
                other => Err(format!("envelope payload must be a class, found {}", other.describe())),
            },
            Self::Stream { item, .. } => match item.as_ref() {
                Self::Class(_) => Ok(()),
                Self::Envelope(_) => item.validate_slot(),
                other => Err(format!("stream item must be a class or envelope, found {}", other.describe())),
            },
            Self::Composite(_) => Err("composite types cannot be nested".to_string()),
        }
    }

    /// Short human-readable rendering, e.g. `stream<envelope<int>>`.
    pub fn describe(&self) -> String {
        match self {
            Self::Class(class) => class.to_string(),
            Self::Envelope(payload) => format!("envelope<{}>", payload.describe()),
            Self::Stream { kind: StreamKind::Single, item } => format!("single<{}>", item.describe()),
            Self::Stream { kind: StreamKind::Many, item } => format!("stream<{}>", item.describe()),
            Self::Composite(slots) => {
                let inner: Vec<String> = slots.iter().map(|s| s.describe()).collect();
                format!("({})", inner.join(", "))
            }
        }
    }
}

impl From<TypeClass> for DeclaredType {
    fn from(class: TypeClass) -> Self {
        Self::Class(class)
    }
}

/// Serialized form of a descriptor, validated on the way in.
#[derive(Debug, Clone, Deserialize)]
struct DescriptorSpec {
    names: Vec<String>,
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    input: DeclaredType,
}

/// The declared input of one callable unit.
///
/// Simple when `input` is anything but a composite (one implicit slot);
/// composite otherwise, with one slot per positional argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DescriptorSpec")]
pub struct InputDescriptor {
    names: Vec<String>,
    #[serde(serialize_with = "serde_yaml::with::singleton_map_recursive::serialize")]
    input: DeclaredType,
}

impl InputDescriptor {
    /// Validate and build a descriptor.
    ///
    /// Composite inputs must carry 2–8 slots. Composites may not nest, and
    /// streams and envelopes wrap at most one layer each (stream outermost).
    pub fn new(names: Vec<String>, input: DeclaredType) -> Result<Self, AdapterError> {
        match &input {
            DeclaredType::Composite(slots) => {
                if !(MIN_ARITY..=MAX_ARITY).contains(&slots.len()) {
                    return Err(AdapterError::InvalidDescriptor(format!(
                        "composite input must have {}..={} slots, found {}",
                        MIN_ARITY,
                        MAX_ARITY,
                        slots.len()
                    )));
                }
                for (index, slot) in slots.iter().enumerate() {
                    slot.validate_slot().map_err(|e| {
                        AdapterError::InvalidDescriptor(format!("slot {}: {}", index, e))
                    })?;
                }
            }
            single => single.validate_slot().map_err(AdapterError::InvalidDescriptor)?,
        }
        Ok(Self { names, input })
    }

    /// Descriptor for a unit with a single name.
    pub fn named(name: impl Into<String>, input: DeclaredType) -> Result<Self, AdapterError> {
        Self::new(vec![name.into()], input)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The unit's names as they appear in diagnostics, e.g. `[uppercase]`.
    pub fn unit_label(&self) -> String {
        format!("[{}]", self.names.join(", "))
    }

    pub fn input(&self) -> &DeclaredType {
        &self.input
    }

    pub fn is_composite(&self) -> bool {
        self.input.is_composite()
    }

    /// Slot count of a composite descriptor; `None` for a simple one.
    pub fn arity(&self) -> Option<usize> {
        match &self.input {
            DeclaredType::Composite(slots) => Some(slots.len()),
            _ => None,
        }
    }

    /// Declared types of the composite slots; `None` for a simple descriptor.
    pub fn slots(&self) -> Option<&[DeclaredType]> {
        match &self.input {
            DeclaredType::Composite(slots) => Some(slots),
            _ => None,
        }
    }

    /// Whether the unit's whole input is declared as a stream.
    pub fn is_reactive(&self) -> bool {
        self.input.is_stream()
    }
}

impl TryFrom<DescriptorSpec> for InputDescriptor {
    type Error = AdapterError;

    fn try_from(spec: DescriptorSpec) -> Result<Self, Self::Error> {
        Self::new(spec.names, spec.input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> DeclaredType {
        DeclaredType::class(TypeClass::Int)
    }

    #[test]
    fn effective_class_unwraps_stream_before_envelope() {
        assert_eq!(int().effective_class(), TypeClass::Int);
        assert_eq!(DeclaredType::stream(int()).effective_class(), TypeClass::Int);
        assert_eq!(DeclaredType::envelope(int()).effective_class(), TypeClass::Int);
        assert_eq!(
            DeclaredType::single(DeclaredType::envelope(int())).effective_class(),
            TypeClass::Int
        );
    }

    #[test]
    fn expects_envelope_looks_through_stream() {
        assert!(DeclaredType::envelope(int()).expects_envelope());
        assert!(DeclaredType::stream(DeclaredType::envelope(int())).expects_envelope());
        assert!(!DeclaredType::stream(int()).expects_envelope());
    }

    #[test]
    fn composite_arity_bounds_enforced() {
        let one = InputDescriptor::named("f", DeclaredType::composite(vec![int()]));
        assert!(matches!(one, Err(AdapterError::InvalidDescriptor(_))));

        let nine = InputDescriptor::named("f", DeclaredType::composite(vec![int(); 9]));
        assert!(nine.is_err());

        let eight = InputDescriptor::named("f", DeclaredType::composite(vec![int(); 8])).unwrap();
        assert_eq!(eight.arity(), Some(8));
    }

    #[test]
    fn nested_composite_rejected() {
        let nested = DeclaredType::composite(vec![
            int(),
            DeclaredType::composite(vec![int(), int()]),
        ]);
        assert!(InputDescriptor::named("f", nested).is_err());

        let stream_of_composite = DeclaredType::stream(DeclaredType::composite(vec![int(), int()]));
        assert!(InputDescriptor::named("f", stream_of_composite).is_err());
    }

    #[test]
    fn double_wrapping_rejected() {
        let stream_of_stream = DeclaredType::stream(DeclaredType::stream(int()));
        assert!(InputDescriptor::named("f", stream_of_stream).is_err());

        let envelope_of_stream = DeclaredType::envelope(DeclaredType::stream(int()));
        assert!(InputDescriptor::named("f", envelope_of_stream).is_err());
    }

    #[test]
    fn simple_descriptor_has_no_arity() {
        let d = InputDescriptor::named("uppercase", DeclaredType::stream(int())).unwrap();
        assert!(!d.is_composite());
        assert_eq!(d.arity(), None);
        assert!(d.is_reactive());
        assert_eq!(d.unit_label(), "[uppercase]");
    }

    #[test]
    fn descriptor_loads_from_yaml() {
        let yaml = r#"
names: [enrich, enrichOrder]
input:
  composite:
    - class: int
    - envelope:
        class:
          named: Order
    - stream:
        kind: many
        item:
          class: text
"#;
        let d = InputDescriptor::from_yaml_str(yaml).unwrap();
        assert_eq!(d.arity(), Some(3));
        assert_eq!(d.unit_label(), "[enrich, enrichOrder]");
        let slots = d.slots().unwrap();
        assert_eq!(slots[1].effective_class(), TypeClass::named("Order"));
        assert_eq!(slots[2].stream_kind(), Some(StreamKind::Many));
        assert_eq!(slots[2].describe(), "stream<text>");
    }

    #[test]
    fn stream_descriptor_loads_from_yaml() {
        let yaml = "names: [f]\ninput:\n  stream:\n    kind: many\n    item:\n      class: int\n";
        let d = InputDescriptor::from_yaml_str(yaml).unwrap();
        assert!(d.is_reactive());
        assert_eq!(d.input(), &DeclaredType::stream(int()));
    }

    #[test]
    fn descriptor_yaml_round_trips() {
        let d = InputDescriptor::named(
            "enrich",
            DeclaredType::composite(vec![
                DeclaredType::single(DeclaredType::envelope(int())),
                DeclaredType::class(TypeClass::named("Order")),
            ]),
        )
        .unwrap();

        let yaml = d.to_yaml_string().unwrap();
        assert!(yaml.contains("composite:"), "{}", yaml);
        assert_eq!(InputDescriptor::from_yaml_str(&yaml).unwrap(), d);
    }

    #[test]
    fn invalid_yaml_descriptor_is_rejected() {
        let yaml = "names: [f]\ninput:\n  composite:\n    - class: int\n";
        assert!(matches!(
            InputDescriptor::from_yaml_str(yaml),
            Err(ConfigError::Yaml(_))
        ));
    }
}
