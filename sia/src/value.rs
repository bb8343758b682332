// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamic values carried by the codec.

use core::any::{Any, TypeId};
use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

/// Insertion-ordered string-keyed map used for objects.
pub type Map = IndexMap<String, Value>;

/// A dynamic value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// `null`.
    Null,
    /// `undefined`.
    Undefined,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A double-precision float.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// A raw byte string.
    Bytes(Vec<u8>),
    /// An ordered sequence.
    Array(Vec<Value>),
    /// An insertion-ordered map. A repeated key keeps its first position and its last value.
    Object(Map),
    /// A registered custom type.
    Custom(Custom),
}

/// Coarse value classification used in diagnostics.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// `null`.
    Null,
    /// `undefined`.
    Undefined,
    /// A boolean.
    Bool,
    /// An integer.
    Int,
    /// A float.
    Float,
    /// A string.
    String,
    /// A byte string.
    Bytes,
    /// An array.
    Array,
    /// An object.
    Object,
    /// A custom value.
    Custom,
}

impl ValueKind {
    /// Returns a short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Array => "array",
            Self::Object => "object",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// Returns the value's kind.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Undefined => ValueKind::Undefined,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::Array(_) => ValueKind::Array,
            Self::Object(_) => ValueKind::Object,
            Self::Custom(_) => ValueKind::Custom,
        }
    }

    /// Returns `true` for values that are interned and referenced by backreference.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Null
                | Self::Undefined
                | Self::Bool(_)
                | Self::Int(_)
                | Self::Float(_)
                | Self::String(_)
        )
    }

    /// Returns the numeric value as `f64`, if this is an `Int` or a `Float`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss, reason = "program arithmetic is f64")]
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string slice, if this is a `String`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the array elements, if this is an `Array`.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Returns a custom value of type `T`, if this is a `Custom` holding one.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Custom(c) => c.downcast_ref(),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Self::Object(v)
    }
}

impl From<Custom> for Value {
    fn from(v: Custom) -> Self {
        Self::Custom(v)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k.into(), v.into());
        }
        Self::Object(map)
    }
}

/// A value type that can travel through a [`Registry`](crate::registry::Registry).
///
/// Implemented for every `'static` type that is `Debug + PartialEq + Send + Sync`.
pub trait CustomValue: Any + fmt::Debug + Send + Sync {
    /// Upcasts to [`Any`].
    fn as_any(&self) -> &dyn Any;
    /// Compares with another custom value of possibly different type.
    fn eq_dyn(&self, other: &dyn CustomValue) -> bool;
    /// Returns the concrete type name.
    fn type_name(&self) -> &'static str;
}

impl<T: Any + fmt::Debug + PartialEq + Send + Sync> CustomValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_dyn(&self, other: &dyn CustomValue) -> bool {
        other.as_any().downcast_ref::<T>() == Some(self)
    }

    fn type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }
}

/// A shared, type-erased custom value.
///
/// Two custom values are equal when they hold the same concrete type and compare equal.
#[derive(Clone)]
pub struct Custom(Arc<dyn CustomValue>);

impl Custom {
    /// Wraps `value`.
    pub fn new<T: CustomValue>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Returns the concrete type id.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        Any::type_id(self.0.as_any())
    }

    /// Returns the concrete type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    /// Returns the inner value if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }

    /// Identity of the shared allocation, stable while any clone is alive.
    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl PartialEq for Custom {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_dyn(&*other.0)
    }
}

impl fmt::Debug for Custom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Point(i32, i32);

    #[derive(Debug, PartialEq)]
    struct Other(i32, i32);

    #[test]
    fn custom_equality_is_typed() {
        let a = Value::Custom(Custom::new(Point(1, 2)));
        let b = Value::Custom(Custom::new(Point(1, 2)));
        let c = Value::Custom(Custom::new(Other(1, 2)));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.downcast_ref::<Point>(), Some(&Point(1, 2)));
        assert_eq!(c.downcast_ref::<Point>(), None);
    }

    #[test]
    fn object_repeated_key_keeps_position() {
        let v: Value = [("a", Value::Int(1)), ("b", Value::Int(2)), ("a", Value::Int(3))]
            .into_iter()
            .collect();
        let Value::Object(map) = v else {
            panic!("expected object");
        };
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(map["a"], Value::Int(3));
    }

    #[test]
    fn primitives() {
        assert!(Value::Null.is_primitive());
        assert!(Value::from("x").is_primitive());
        assert!(!Value::Bytes(vec![]).is_primitive());
        assert!(!Value::Array(vec![]).is_primitive());
        assert_eq!(Value::Int(2).as_f64(), Some(2.0));
        assert_eq!(Value::Bool(true).as_f64(), None);
    }
}
