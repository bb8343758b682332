// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `sia`: a compact, self-describing binary serialization format.
//!
//! A Sia stream is a sequence of one-byte tags with payloads. Every value-producing tag takes the
//! next index in a per-session block table, so repeated primitives are written once and then
//! backreferenced. Containers, custom-type constructors and small embedded programs are built from
//! the same block table.
//!
//! ## Example
//!
//! ```
//! use sia::builtins::Date;
//! use sia::value::{Custom, Value};
//!
//! let v: Value = [
//!     ("name", Value::from("sia")),
//!     ("tags", Value::Array(vec!["a".into(), "a".into()])),
//!     ("at", Value::Custom(Custom::new(Date { millis: 1.5e12 }))),
//! ]
//! .into_iter()
//! .collect();
//!
//! let bytes = sia::serialize(&v)?;
//! assert_eq!(sia::deserialize(&bytes)?, v);
//! # Ok::<(), Box<dyn core::error::Error>>(())
//! ```
//!
//! Streaming encodes hand whole-tag chunks to a [`encoder::BlockSink`]; a
//! [`Decoder`] fed with [`Decoder::deserialize_blocks`] reaches the same value.

pub mod builtins;
pub mod codec;
pub mod decoder;
pub mod disasm;
pub mod encoder;
pub mod format;
mod global;
pub(crate) mod intern;
pub mod program;
pub mod registry;
pub mod tag;
pub mod trace;
pub mod value;
pub mod vm;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use global::{deserialize, serialize};
pub use registry::Registry;
pub use value::Value;
