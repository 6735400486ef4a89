//! Value marshalling across the boundary.
//!
//! [`Value`] is the managed side's view of a value. Absence is always
//! [`Value::Null`], whatever the kind: `Option<T>` maps `None` to `Null`
//! and `Some(v)` to the plain encoding of `v`.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::error::{Error, Result, VALUE_IS_NULL};
use crate::ffi::NativeHandle;
use crate::object::NativeObject;

/// A value as seen by the managed runtime.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    /// A handle-owning object, passed by its handle.
    Object(NativeHandle),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of this value's kind, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Char(_) => "char",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }

    fn mismatch(&self, expected: &str) -> Error {
        Error::IllegalArgument(format!("expected {expected}, found {}", self.kind()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::Char(v) => match char::from_u32(u32::from(*v)) {
                Some(c) => write!(f, "{c}"),
                None => write!(f, "\\u{v:04x}"),
            },
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                f.write_str("}")
            }
            Value::Object(handle) => write!(f, "Object@{:x}", handle.as_raw()),
        }
    }
}

/// Convert a Rust value into its boundary representation.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Convert a boundary value back into Rust.
pub trait FromValue: Sized {
    /// Decode a non-null value.
    fn from_value(value: Value) -> Result<Self>;

    /// What null decodes to, if this type accepts it.
    fn from_null() -> Option<Self> {
        None
    }
}

/// Decode `value`, rejecting null for non-optional types.
pub fn from_value<T: FromValue>(value: Value) -> Result<T> {
    if value.is_null() {
        return T::from_null().ok_or_else(|| Error::Runtime(VALUE_IS_NULL.to_string()));
    }
    T::from_value(value)
}

macro_rules! impl_convert {
    ($ty:ty, $variant:ident, $kind:literal) => {
        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(other.mismatch($kind)),
                }
            }
        }
    };
}

impl_convert!(bool, Bool, "boolean");
impl_convert!(i8, Byte, "byte");
impl_convert!(i16, Short, "short");
impl_convert!(u16, Char, "char");
impl_convert!(i32, Int, "int");
impl_convert!(i64, Long, "long");
impl_convert!(f32, Float, "float");
impl_convert!(f64, Double, "double");
impl_convert!(String, String, "string");

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }

    fn from_null() -> Option<Self> {
        Some(Value::Null)
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Null
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        from_value(value).map(Some)
    }

    fn from_null() -> Option<Self> {
        Some(None)
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items.into_iter().map(from_value).collect(),
            other => Err(other.mismatch("list")),
        }
    }
}

impl<K: IntoValue, V: IntoValue> IntoValue for HashMap<K, V> {
    fn into_value(self) -> Value {
        Value::Map(
            self.into_iter()
                .map(|(k, v)| (k.into_value(), v.into_value()))
                .collect(),
        )
    }
}

impl<K: FromValue + Eq + Hash, V: FromValue> FromValue for HashMap<K, V> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| -> Result<(K, V)> { Ok((from_value(k)?, from_value(v)?)) })
                .collect(),
            other => Err(other.mismatch("map")),
        }
    }
}

impl IntoValue for NativeHandle {
    fn into_value(self) -> Value {
        Value::Object(self)
    }
}

/// A released handle is rejected here, before any native call sees it.
impl FromValue for NativeHandle {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(handle) if handle.is_valid() => Ok(handle),
            Value::Object(_) => Err(Error::null_pointer()),
            other => Err(other.mismatch("object")),
        }
    }
}

impl IntoValue for &NativeObject {
    fn into_value(self) -> Value {
        Value::Object(self.handle())
    }
}
