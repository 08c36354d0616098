//! Selective-field JSON encoding.
//!
//! Request structs hold their data fields plus a [`FieldState`]. Encoding walks
//! the declared fields in order and applies, per field:
//!
//! 1. name in `null_fields` → `"name": null`, whatever the current value;
//! 2. optional field holding `Some`, or any non-zero value → the encoded value;
//! 3. name in `force_send_fields` → the zero-value encoding (`false`, `0`, `""`,
//!    `[]`, `{}`; `null` for an unset optional);
//! 4. otherwise the key is omitted.
//!
//! A struct opts in by implementing [`Presence`] and routing its `Serialize`
//! impl through [`serialize_presence`]. Nested presence-aware structs then go
//! through the same rules with their own state.
//!
//! ```rust
//! use serde::{Serialize, Serializer};
//! use spotinst_types::FieldState;
//! use spotinst_util::presence::{CodecError, Presence, PresenceEncoder, serialize_presence};
//!
//! #[derive(Default)]
//! struct Strategy {
//!     risk: Option<i64>,
//!     fallback_to_od: bool,
//!     state: FieldState,
//! }
//!
//! impl Presence for Strategy {
//!     fn field_state(&self) -> &FieldState { &self.state }
//!     fn field_state_mut(&mut self) -> &mut FieldState { &mut self.state }
//!     fn encode_fields(&self, encoder: &mut PresenceEncoder<'_>) -> Result<(), CodecError> {
//!         encoder.field("risk", &self.risk)?.field("fallbackToOd", &self.fallback_to_od)?;
//!         Ok(())
//!     }
//! }
//!
//! impl Serialize for Strategy {
//!     fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
//!         serialize_presence(self, serializer)
//!     }
//! }
//!
//! let strategy = Strategy::default().with_force_send("fallbackToOd").with_null("risk");
//! assert_eq!(
//!     serde_json::to_string(&strategy).unwrap(),
//!     r#"{"risk":null,"fallbackToOd":false}"#
//! );
//! ```

use std::fmt;

use serde::ser::{self, Impossible};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use spotinst_types::FieldState;
use thiserror::Error;

/// Failure while encoding a presence-aware struct.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode field '{field}': {source}")]
    Field {
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("flattened value '{context}' must encode to a JSON object, got {found}")]
    NotAnObject { context: String, found: &'static str },
}

/// A struct whose JSON form is governed by a [`FieldState`].
pub trait Presence {
    fn field_state(&self) -> &FieldState;

    fn field_state_mut(&mut self) -> &mut FieldState;

    /// Feed every declared field, in declaration order, to `encoder`.
    fn encode_fields(&self, encoder: &mut PresenceEncoder<'_>) -> Result<(), CodecError>;

    fn set_null(&mut self, name: &str) {
        self.field_state_mut().set_null(name);
    }

    fn force_send(&mut self, name: &str) {
        self.field_state_mut().force_send(name);
    }

    fn with_null(mut self, name: &str) -> Self
    where
        Self: Sized,
    {
        self.set_null(name);
        self
    }

    fn with_force_send(mut self, name: &str) -> Self
    where
        Self: Sized,
    {
        self.force_send(name);
        self
    }
}

/// Encoded value of one declared field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// An optional field holding `None`.
    Unset,
    /// An optional field holding `Some`; always emitted.
    Set(Value),
    /// A non-optional field; emitted unless it is a zero value.
    Plain(Value),
}

impl FieldValue {
    /// Encode `value`, recording whether it was an `Option` and which variant.
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        match value.serialize(OptionProbe) {
            Ok(OptionShape::Unset) => Ok(FieldValue::Unset),
            Ok(OptionShape::Set(encoded)) => Ok(FieldValue::Set(encoded)),
            Err(ProbeError::Json(error)) => Err(error),
            Ok(OptionShape::NotOptional) | Err(ProbeError::NotOptional) | Err(ProbeError::Custom(_)) => {
                serde_json::to_value(value).map(FieldValue::Plain)
            }
        }
    }
}

/// Collects the encoded fields of one struct instance.
#[derive(Debug)]
pub struct PresenceEncoder<'a> {
    state: &'a FieldState,
    object: Map<String, Value>,
}

impl<'a> PresenceEncoder<'a> {
    pub fn new(state: &'a FieldState) -> Self {
        Self {
            state,
            object: Map::new(),
        }
    }

    /// Encode one declared field under its JSON key.
    pub fn field<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<&mut Self, CodecError> {
        let field_value = FieldValue::of(value).map_err(|source| CodecError::Field {
            field: name.to_string(),
            source,
        })?;
        self.push(name, field_value);
        Ok(self)
    }

    /// Splice the keys of a composed base struct into this object.
    ///
    /// The base is encoded with its own rules (and its own state), so the
    /// parent's state does not apply to the spliced keys. An unset optional
    /// base contributes nothing.
    pub fn flatten<T: Serialize + ?Sized>(&mut self, context: &str, base: &T) -> Result<&mut Self, CodecError> {
        let encoded = serde_json::to_value(base).map_err(|source| CodecError::Field {
            field: context.to_string(),
            source,
        })?;
        match encoded {
            Value::Object(entries) => self.object.extend(entries),
            Value::Null => {}
            other => {
                return Err(CodecError::NotAnObject {
                    context: context.to_string(),
                    found: value_kind(&other),
                });
            }
        }
        Ok(self)
    }

    /// Push an already-encoded field.
    pub fn push(&mut self, name: &str, value: FieldValue) {
        if let Some(encoded) = resolve_field(self.state, name, value) {
            self.object.insert(name.to_string(), encoded);
        }
    }

    pub fn finish(self) -> Map<String, Value> {
        self.object
    }
}

/// Encode a struct with the state it carries.
pub fn encode<T: Presence + ?Sized>(value: &T) -> Result<Map<String, Value>, CodecError> {
    encode_with(value, value.field_state())
}

/// Encode a struct's fields under an explicitly supplied state, ignoring the
/// one it carries.
pub fn encode_with<T: Presence + ?Sized>(value: &T, state: &FieldState) -> Result<Map<String, Value>, CodecError> {
    let mut encoder = PresenceEncoder::new(state);
    value.encode_fields(&mut encoder)?;
    Ok(encoder.finish())
}

/// Encode a pre-built list of `(name, value)` pairs.
pub fn encode_fields<'n, I>(fields: I, state: &FieldState) -> Map<String, Value>
where
    I: IntoIterator<Item = (&'n str, FieldValue)>,
{
    let mut encoder = PresenceEncoder::new(state);
    for (name, value) in fields {
        encoder.push(name, value);
    }
    encoder.finish()
}

/// `Serialize` body for presence-aware structs.
pub fn serialize_presence<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Presence + ?Sized,
    S: Serializer,
{
    encode(value).map_err(ser::Error::custom)?.serialize(serializer)
}

/// Apply the presence rules to a single field.
pub fn resolve_field(state: &FieldState, name: &str, value: FieldValue) -> Option<Value> {
    if state.is_null(name) {
        return Some(Value::Null);
    }
    match value {
        FieldValue::Set(encoded) => Some(encoded),
        FieldValue::Plain(encoded) if !is_zero(&encoded) || state.is_forced(name) => Some(encoded),
        FieldValue::Unset if state.is_forced(name) => Some(Value::Null),
        FieldValue::Plain(_) | FieldValue::Unset => None,
    }
}

/// Zero values are omitted unless force-sent.
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => {
            number.as_i64() == Some(0) || number.as_u64() == Some(0) || number.as_f64() == Some(0.0)
        }
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Result of probing a value's outermost shape.
enum OptionShape {
    Unset,
    Set(Value),
    NotOptional,
}

#[derive(Debug, Error)]
enum ProbeError {
    #[error("value is not an option")]
    NotOptional,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Custom(String),
}

impl ser::Error for ProbeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ProbeError::Custom(msg.to_string())
    }
}

/// Serializer that only answers "is this `None`, `Some(_)`, or neither?".
struct OptionProbe;

macro_rules! not_optional {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method(self, _value: $ty) -> Result<OptionShape, ProbeError> {
                Ok(OptionShape::NotOptional)
            }
        )*
    };
}

impl ser::Serializer for OptionProbe {
    type Ok = OptionShape;
    type Error = ProbeError;
    type SerializeSeq = Impossible<OptionShape, ProbeError>;
    type SerializeTuple = Impossible<OptionShape, ProbeError>;
    type SerializeTupleStruct = Impossible<OptionShape, ProbeError>;
    type SerializeTupleVariant = Impossible<OptionShape, ProbeError>;
    type SerializeMap = Impossible<OptionShape, ProbeError>;
    type SerializeStruct = Impossible<OptionShape, ProbeError>;
    type SerializeStructVariant = Impossible<OptionShape, ProbeError>;

    not_optional! {
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_f32: f32,
        serialize_f64: f64,
        serialize_char: char,
        serialize_str: &str,
        serialize_bytes: &[u8],
    }

    fn serialize_none(self) -> Result<OptionShape, ProbeError> {
        Ok(OptionShape::Unset)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<OptionShape, ProbeError> {
        Ok(OptionShape::Set(serde_json::to_value(value)?))
    }

    fn serialize_unit(self) -> Result<OptionShape, ProbeError> {
        Ok(OptionShape::NotOptional)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<OptionShape, ProbeError> {
        Ok(OptionShape::NotOptional)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<OptionShape, ProbeError> {
        Ok(OptionShape::NotOptional)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _value: &T,
    ) -> Result<OptionShape, ProbeError> {
        Ok(OptionShape::NotOptional)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<OptionShape, ProbeError> {
        Ok(OptionShape::NotOptional)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, ProbeError> {
        Err(ProbeError::NotOptional)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, ProbeError> {
        Err(ProbeError::NotOptional)
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeTupleStruct, ProbeError> {
        Err(ProbeError::NotOptional)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, ProbeError> {
        Err(ProbeError::NotOptional)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, ProbeError> {
        Err(ProbeError::NotOptional)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct, ProbeError> {
        Err(ProbeError::NotOptional)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, ProbeError> {
        Err(ProbeError::NotOptional)
    }
}
