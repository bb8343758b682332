// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Encoder-side intern tables: primitive value to block index.

use hashbrown::HashMap;

use crate::value::Value;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Scalar {
    Null,
    Undefined,
    Bool(bool),
    Int(i64),
    // Keyed by bit pattern so `0.0`/`-0.0` and NaN payloads stay distinct.
    Float(u64),
}

impl Scalar {
    fn of(v: &Value) -> Option<Self> {
        Some(match v {
            Value::Null => Self::Null,
            Value::Undefined => Self::Undefined,
            Value::Bool(b) => Self::Bool(*b),
            Value::Int(i) => Self::Int(*i),
            Value::Float(f) => Self::Float(f.to_bits()),
            _ => return None,
        })
    }
}

/// Per-session map from primitive values to the block index of their first occurrence.
#[derive(Debug, Default)]
pub(crate) struct InternTable {
    scalars: HashMap<Scalar, u64>,
    strings: HashMap<Box<str>, u64>,
}

impl InternTable {
    pub(crate) fn get(&self, v: &Value) -> Option<u64> {
        match v {
            Value::String(s) => self.strings.get(s.as_str()).copied(),
            other => self.scalars.get(&Scalar::of(other)?).copied(),
        }
    }

    pub(crate) fn get_str(&self, s: &str) -> Option<u64> {
        self.strings.get(s).copied()
    }

    /// Records `v` at `block`. Non-primitive values are ignored.
    pub(crate) fn insert(&mut self, v: &Value, block: u64) {
        match v {
            Value::String(s) => {
                self.strings.insert(s.as_str().into(), block);
            }
            other => {
                if let Some(k) = Scalar::of(other) {
                    self.scalars.insert(k, block);
                }
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.scalars.clear();
        self.strings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_exact() {
        let mut t = InternTable::default();
        t.insert(&Value::Int(1), 0);
        t.insert(&Value::Float(0.0), 1);
        t.insert(&Value::from("1"), 2);
        t.insert(&Value::Array(vec![]), 3);

        assert_eq!(t.get(&Value::Int(1)), Some(0));
        assert_eq!(t.get(&Value::Float(1.0)), None);
        assert_eq!(t.get(&Value::Float(0.0)), Some(1));
        assert_eq!(t.get(&Value::Float(-0.0)), None);
        assert_eq!(t.get(&Value::from("1")), Some(2));
        assert_eq!(t.get_str("1"), Some(2));
        assert_eq!(t.get(&Value::Array(vec![])), None);

        t.clear();
        assert_eq!(t.get(&Value::Int(1)), None);
    }
}
