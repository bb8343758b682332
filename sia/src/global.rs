// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Default-instance helpers.
//!
//! Each thread keeps one lazily created [`Encoder`] and [`Decoder`] with default configuration,
//! so repeated calls reuse their buffers. A call made while the thread's instance is already in
//! use (from inside a streaming callback, for example) runs on a fresh instance instead.

use core::cell::RefCell;

use crate::decoder::{DecodeError, Decoder};
use crate::encoder::{EncodeError, Encoder};
use crate::value::Value;

thread_local! {
    static ENCODER: RefCell<Encoder> = RefCell::new(Encoder::default());
    static DECODER: RefCell<Decoder> = RefCell::new(Decoder::default());
}

/// Encodes `value` with the thread's default encoder.
pub fn serialize(value: &Value) -> Result<Vec<u8>, EncodeError> {
    ENCODER.with(|enc| match enc.try_borrow_mut() {
        Ok(mut enc) => enc.serialize(value),
        Err(_) => Encoder::default().serialize(value),
    })
}

/// Decodes a complete stream with the thread's default decoder.
pub fn deserialize(bytes: &[u8]) -> Result<Value, DecodeError> {
    DECODER.with(|dec| match dec.try_borrow_mut() {
        Ok(mut dec) => dec.deserialize(bytes),
        Err(_) => Decoder::default().deserialize(bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let v = Value::Array(vec![Value::Int(-3), "x".into(), Value::Null]);
        assert_eq!(deserialize(&serialize(&v).unwrap()).unwrap(), v);
    }

    #[test]
    fn nested_use_falls_back_to_fresh_instances() {
        let mut inner = None;
        ENCODER.with(|enc| {
            let _held = enc.borrow_mut();
            inner = Some(serialize(&Value::Bool(true)));
        });
        assert_eq!(inner, Some(Ok(vec![0x1F, 0xFF])));

        let bytes = serialize(&Value::Int(4)).unwrap();
        let mut decoded = None;
        DECODER.with(|dec| {
            let _held = dec.borrow_mut();
            decoded = Some(deserialize(&bytes));
        });
        assert_eq!(decoded, Some(Ok(Value::Int(4))));
    }
}
