// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in custom types: [`Date`], [`RegExp`] and [`Set`].

use crate::registry::Registry;
use crate::value::Value;

/// Constructor code of [`Date`].
pub const DATE_CODE: u64 = 0;
/// Constructor code of [`RegExp`].
pub const REGEXP_CODE: u64 = 1;
/// Constructor code of [`Set`].
pub const SET_CODE: u64 = 2;

/// A point in time, in milliseconds since the Unix epoch.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Date {
    /// Milliseconds since the Unix epoch.
    pub millis: f64,
}

/// A regular expression, kept as source text and flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegExp {
    /// Pattern source.
    pub source: String,
    /// Flag letters.
    pub flags: String,
}

/// An ordered collection of distinct values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Set(pub Vec<Value>);

pub(crate) fn register(r: &mut Registry) {
    let date = r.register::<Date, _, _>(
        DATE_CODE,
        |d| vec![Value::Float(d.millis)],
        |args| match args.as_slice() {
            [millis] => millis.as_f64().map(|millis| Date { millis }),
            _ => None,
        },
    );
    let regexp = r.register::<RegExp, _, _>(
        REGEXP_CODE,
        |re| {
            vec![
                Value::String(re.source.clone()),
                Value::String(re.flags.clone()),
            ]
        },
        |args| match args.as_slice() {
            [Value::String(source), Value::String(flags)] => Some(RegExp {
                source: source.clone(),
                flags: flags.clone(),
            }),
            _ => None,
        },
    );
    let set = r.register::<Set, _, _>(
        SET_CODE,
        |s| s.0.clone(),
        |args| Some(Set(args)),
    );
    debug_assert!(
        date.is_ok() && regexp.is_ok() && set.is_ok(),
        "built-in codes are distinct"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Custom;

    #[test]
    fn date_round_trips_through_args() {
        let r = Registry::with_builtins();
        let d = Custom::new(Date { millis: 1.5e12 });
        let ctor = r.lookup_value(&d).unwrap();
        let args = ctor.args(&d).unwrap();
        assert_eq!(args, vec![Value::Float(1.5e12)]);
        assert_eq!(ctor.build(args), Some(Value::Custom(d)));
    }

    #[test]
    fn date_accepts_integer_millis() {
        let r = Registry::with_builtins();
        let built = r.lookup_code(DATE_CODE).unwrap().build(vec![Value::Int(10)]);
        assert_eq!(
            built.as_ref().and_then(Value::downcast_ref::<Date>),
            Some(&Date { millis: 10.0 })
        );
    }

    #[test]
    fn regexp_needs_two_strings() {
        let r = Registry::with_builtins();
        let ctor = r.lookup_code(REGEXP_CODE).unwrap();
        assert!(ctor.build(vec![Value::from("a+")]).is_none());
        let built = ctor.build(vec![Value::from("a+"), Value::from("gi")]);
        assert_eq!(
            built.as_ref().and_then(Value::downcast_ref::<RegExp>),
            Some(&RegExp {
                source: "a+".into(),
                flags: "gi".into()
            })
        );
    }
}
