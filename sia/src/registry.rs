// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Custom-type registry.
//!
//! A [`Registry`] maps a numeric constructor code to a pair of functions: one that extracts an
//! argument list from a live value, and one that rebuilds the value from that list. An optional
//! predicate narrows which values of a type a constructor accepts. Encoders and
//! decoders that exchange custom values must share an equivalent registry.

use core::any::TypeId;
use core::fmt;

use hashbrown::HashMap;

use crate::builtins;
use crate::value::{Custom, CustomValue, Value};

/// A registry error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// The code is already taken.
    DuplicateCode {
        /// Constructor code.
        code: u64,
    },
    /// The code does not fit in 32 bits.
    CodeTooBig {
        /// Constructor code.
        code: u64,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateCode { code } => write!(f, "constructor code {code} is already registered"),
            Self::CodeTooBig { code } => write!(f, "code {code} too big for a constructor"),
        }
    }
}

impl core::error::Error for RegistryError {}

type MatchFn = dyn Fn(&Custom) -> bool + Send + Sync;
type ArgsFn = dyn Fn(&Custom) -> Option<Vec<Value>> + Send + Sync;
type BuildFn = dyn Fn(Vec<Value>) -> Option<Value> + Send + Sync;

/// A registered custom type.
pub struct Constructor {
    code: u32,
    name: &'static str,
    matches: Box<MatchFn>,
    args: Box<ArgsFn>,
    build: Box<BuildFn>,
}

impl Constructor {
    /// Returns the constructor code.
    #[must_use]
    pub fn code(&self) -> u32 {
        self.code
    }

    /// Returns the registered type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if this constructor encodes `value`.
    #[must_use]
    pub fn matches(&self, value: &Custom) -> bool {
        (self.matches)(value)
    }

    /// Extracts the argument list from `value`.
    ///
    /// Returns `None` if `value` is not of the registered type.
    #[must_use]
    pub fn args(&self, value: &Custom) -> Option<Vec<Value>> {
        (self.args)(value)
    }

    /// Rebuilds a value from `args`.
    ///
    /// Returns `None` if the arguments do not describe a value of the registered type.
    #[must_use]
    pub fn build(&self, args: Vec<Value>) -> Option<Value> {
        (self.build)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("code", &self.code)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Ordered table of custom-type constructors.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<Constructor>,
    by_code: HashMap<u32, usize>,
    by_type: HashMap<TypeId, Vec<usize>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in `Date`, `RegExp` and `Set` types.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut r = Self::new();
        builtins::register(&mut r);
        r
    }

    /// Registers `T` under `code`.
    ///
    /// `args` extracts the argument list; `build` reconstructs a `T` from it, returning `None`
    /// for malformed arguments.
    pub fn register<T, A, B>(&mut self, code: u64, args: A, build: B) -> Result<(), RegistryError>
    where
        T: CustomValue,
        A: Fn(&T) -> Vec<Value> + Send + Sync + 'static,
        B: Fn(Vec<Value>) -> Option<T> + Send + Sync + 'static,
    {
        self.register_matching(code, |_: &T| true, args, build)
    }

    /// Registers the values of `T` accepted by `matches` under `code`.
    ///
    /// When `T` is registered several times, encoding uses the first registration whose
    /// predicate accepts the value.
    pub fn register_matching<T, M, A, B>(
        &mut self,
        code: u64,
        matches: M,
        args: A,
        build: B,
    ) -> Result<(), RegistryError>
    where
        T: CustomValue,
        M: Fn(&T) -> bool + Send + Sync + 'static,
        A: Fn(&T) -> Vec<Value> + Send + Sync + 'static,
        B: Fn(Vec<Value>) -> Option<T> + Send + Sync + 'static,
    {
        let code32 = u32::try_from(code).map_err(|_| RegistryError::CodeTooBig { code })?;
        if self.by_code.contains_key(&code32) {
            return Err(RegistryError::DuplicateCode { code });
        }
        let ix = self.entries.len();
        self.entries.push(Constructor {
            code: code32,
            name: core::any::type_name::<T>(),
            matches: Box::new(move |c: &Custom| c.downcast_ref::<T>().is_some_and(&matches)),
            args: Box::new(move |c: &Custom| c.downcast_ref::<T>().map(&args)),
            build: Box::new(move |v: Vec<Value>| build(v).map(|t| Value::Custom(Custom::new(t)))),
        });
        self.by_code.insert(code32, ix);
        self.by_type.entry(TypeId::of::<T>()).or_default().push(ix);
        Ok(())
    }

    /// Returns the constructor that handles `value`, if any.
    #[must_use]
    pub fn lookup_value(&self, value: &Custom) -> Option<&Constructor> {
        self.by_type
            .get(&value.type_id())?
            .iter()
            .filter_map(|ix| self.entries.get(*ix))
            .find(|ctor| ctor.matches(value))
    }

    /// Returns the constructor registered under `code`, if any.
    #[must_use]
    pub fn lookup_code(&self, code: u64) -> Option<&Constructor> {
        let code = u32::try_from(code).ok()?;
        let ix = *self.by_code.get(&code)?;
        self.entries.get(ix)
    }

    /// Returns the number of registered constructors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates constructors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Constructor> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }

    fn point_registry() -> Registry {
        let mut r = Registry::new();
        r.register::<Point, _, _>(
            7,
            |p| vec![Value::Int(p.x), Value::Int(p.y)],
            |args| match args.as_slice() {
                [Value::Int(x), Value::Int(y)] => Some(Point { x: *x, y: *y }),
                _ => None,
            },
        )
        .unwrap();
        r
    }

    #[test]
    fn lookup_by_type_and_code() {
        let r = point_registry();
        let c = Custom::new(Point { x: 1, y: 2 });
        let ctor = r.lookup_value(&c).unwrap();
        assert_eq!(ctor.code(), 7);
        assert_eq!(ctor.args(&c), Some(vec![Value::Int(1), Value::Int(2)]));
        assert!(r.lookup_code(7).is_some());
        assert!(r.lookup_code(8).is_none());
        assert!(r.lookup_value(&Custom::new(3_u8)).is_none());
    }

    #[test]
    fn build_rejects_bad_args() {
        let r = point_registry();
        let ctor = r.lookup_code(7).unwrap();
        assert_eq!(
            ctor.build(vec![Value::Int(3), Value::Int(4)]),
            Some(Value::Custom(Custom::new(Point { x: 3, y: 4 })))
        );
        assert_eq!(ctor.build(vec![Value::Null]), None);
    }

    #[test]
    fn duplicate_and_oversized_codes() {
        let mut r = point_registry();
        let dup = r.register::<Point, _, _>(7, |_| vec![], |_| None);
        assert_eq!(dup, Err(RegistryError::DuplicateCode { code: 7 }));
        let big = r.register::<Point, _, _>(1 << 32, |_| vec![], |_| None);
        assert_eq!(
            big.map_err(|e| e.to_string()),
            Err("code 4294967296 too big for a constructor".to_string())
        );
    }

    #[test]
    fn predicates_pick_the_first_matching_registration() {
        let mut r = Registry::new();
        r.register_matching::<Point, _, _, _>(
            10,
            |p| p.x == 0 && p.y == 0,
            |_| vec![],
            |_| Some(Point { x: 0, y: 0 }),
        )
        .unwrap();
        r.register::<Point, _, _>(
            11,
            |p| vec![Value::Int(p.x), Value::Int(p.y)],
            |_| None,
        )
        .unwrap();
        let origin = Custom::new(Point { x: 0, y: 0 });
        let other = Custom::new(Point { x: 1, y: 0 });
        assert_eq!(r.lookup_value(&origin).map(Constructor::code), Some(10));
        assert_eq!(r.lookup_value(&other).map(Constructor::code), Some(11));
        assert!(r.lookup_code(10).unwrap().matches(&origin));
        assert!(!r.lookup_code(10).unwrap().matches(&other));
        assert!(!r.lookup_code(10).unwrap().matches(&Custom::new(3_u8)));
    }

    #[test]
    fn builtins_are_registered() {
        let r = Registry::with_builtins();
        assert_eq!(r.len(), 3);
        let codes: Vec<u32> = r.iter().map(Constructor::code).collect();
        assert_eq!(codes, [0, 1, 2]);
    }
}
