// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Encoding engine.
//!
//! The encoder walks a [`Value`] (or an [`Item`] tree with embedded programs) and writes one
//! tag per unit, numbering blocks exactly as the decoder will. Primitives are interned: the
//! first occurrence is a literal block, later occurrences are backreferences.
//!
//! Custom values are written as a `constructor` tag whose operands are the code block and the
//! argument array block. Those operand blocks are emitted up front, before the enclosing
//! container opens, so they never become container members themselves.

use core::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::decoder::DecodeError;
use crate::format::{self, BufferOverflow, ByteBuffer, Growth};
use crate::intern::InternTable;
use crate::program::{self, CompileError, Item};
use crate::registry::Registry;
use crate::tag::{PayloadKind, Tag};
use crate::value::{Custom, Map, Value};

/// An error reported by a [`BlockSink`].
#[derive(Clone, Debug, PartialEq)]
pub enum SinkError {
    /// A decoder driven by the sink failed.
    Decode(DecodeError),
    /// Any other sink failure.
    Other(String),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "sink decode failed: {e}"),
            Self::Other(msg) => write!(f, "sink failed: {msg}"),
        }
    }
}

impl core::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            Self::Other(_) => None,
        }
    }
}

impl From<DecodeError> for SinkError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

/// Receives whole-tag chunks during a streaming encode.
///
/// Called synchronously from inside the encode call; an implementation may drive a
/// [`Decoder`](crate::decoder::Decoder) with the chunk directly.
pub trait BlockSink {
    /// Called with the bytes written since the previous call.
    fn on_blocks_ready(&mut self, chunk: &[u8]) -> Result<(), SinkError>;
}

impl<F> BlockSink for F
where
    F: FnMut(&[u8]) -> Result<(), SinkError>,
{
    fn on_blocks_ready(&mut self, chunk: &[u8]) -> Result<(), SinkError> {
        self(chunk)
    }
}

/// An encode error.
#[derive(Clone, Debug, PartialEq)]
pub enum EncodeError {
    /// A custom value whose type is not registered.
    UnsupportedValue {
        /// Concrete type name.
        type_name: &'static str,
    },
    /// An array longer than `u32::MAX`.
    ArrayTooBig {
        /// Element count.
        len: u64,
    },
    /// A byte string longer than `u32::MAX`.
    BytesTooBig {
        /// Byte count.
        len: u64,
    },
    /// A fixed-capacity buffer ran out of room.
    BufferOverflow(BufferOverflow),
    /// Containers nested deeper than the configured limit.
    TooDeep {
        /// Configured maximum depth.
        max: usize,
    },
    /// A program failed to compile.
    Compile(CompileError),
    /// The streaming sink failed.
    Sink(SinkError),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedValue { type_name } => {
                write!(f, "Serialization of item {type_name} is not supported")
            }
            Self::ArrayTooBig { len } => write!(f, "Array of size {len} is too big to serialize"),
            Self::BytesTooBig { len } => {
                write!(f, "Buffer of size {len} is too big to serialize")
            }
            Self::BufferOverflow(e) => write!(f, "{e}"),
            Self::TooDeep { max } => write!(f, "nesting deeper than {max}"),
            Self::Compile(e) => write!(f, "{e}"),
            Self::Sink(e) => write!(f, "{e}"),
        }
    }
}

impl core::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::BufferOverflow(e) => Some(e),
            Self::Compile(e) => Some(e),
            Self::Sink(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BufferOverflow> for EncodeError {
    fn from(e: BufferOverflow) -> Self {
        Self::BufferOverflow(e)
    }
}

impl From<CompileError> for EncodeError {
    fn from(e: CompileError) -> Self {
        Self::Compile(e)
    }
}

impl From<SinkError> for EncodeError {
    fn from(e: SinkError) -> Self {
        Self::Sink(e)
    }
}

/// Encoder configuration.
#[derive(Clone, Debug)]
pub struct EncoderConfig {
    /// Initial output buffer capacity in bytes.
    pub initial_capacity: usize,
    /// Buffer growth policy.
    pub growth: Growth,
    /// Tags per streaming chunk (`0` is treated as `1`).
    pub chunk_blocks: usize,
    /// Maximum container nesting.
    pub max_depth: usize,
    /// Constructors for custom values.
    pub registry: Arc<Registry>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 4096,
            growth: Growth::Double,
            chunk_blocks: 1,
            max_depth: 1024,
            registry: Arc::new(Registry::with_builtins()),
        }
    }
}

/// Sia encoder.
///
/// Each `serialize*` call is one session: intern tables, block numbering and the output buffer
/// start fresh. The buffer allocation is reused across sessions.
#[derive(Debug)]
pub struct Encoder {
    config: EncoderConfig,
    buf: ByteBuffer,
    interns: InternTable,
    // Holding the `Custom` keeps its allocation, and so its identity, alive for the session.
    hoisted: HashMap<usize, (Custom, u64, u64)>,
    blocks: u64,
    address_width: u8,
    chunk_start: usize,
    chunk_units: usize,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(EncoderConfig::default())
    }
}

enum Root<'a> {
    Value(&'a Value),
    Item(&'a Item),
}

impl Encoder {
    /// Creates an encoder.
    #[must_use]
    pub fn new(config: EncoderConfig) -> Self {
        let buf = ByteBuffer::new(config.initial_capacity, config.growth);
        Self {
            config,
            buf,
            interns: InternTable::default(),
            hoisted: HashMap::new(),
            blocks: 0,
            address_width: 1,
            chunk_start: 0,
            chunk_units: 0,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Returns the number of blocks produced by the last session.
    #[must_use]
    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    /// Clears session state, keeping the buffer allocation.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.interns.clear();
        self.hoisted.clear();
        self.blocks = 0;
        self.address_width = 1;
        self.chunk_start = 0;
        self.chunk_units = 0;
    }

    /// Encodes `value` into a complete stream.
    pub fn serialize(&mut self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        self.session(Root::Value(value), None)?;
        Ok(self.buf.as_slice().to_vec())
    }

    /// Encodes an item tree (values, arrays and programs) into a complete stream.
    pub fn serialize_item(&mut self, item: &Item) -> Result<Vec<u8>, EncodeError> {
        self.session(Root::Item(item), None)?;
        Ok(self.buf.as_slice().to_vec())
    }

    /// Encodes `value`, handing `sink` a chunk every `chunk_blocks` tags and the tail at the end.
    pub fn serialize_streaming(
        &mut self,
        value: &Value,
        sink: &mut dyn BlockSink,
    ) -> Result<(), EncodeError> {
        self.session(Root::Value(value), Some(sink))
    }

    /// Streaming form of [`Encoder::serialize_item`].
    pub fn serialize_item_streaming(
        &mut self,
        item: &Item,
        sink: &mut dyn BlockSink,
    ) -> Result<(), EncodeError> {
        self.session(Root::Item(item), Some(sink))
    }

    fn session(
        &mut self,
        root: Root<'_>,
        sink: Option<&mut dyn BlockSink>,
    ) -> Result<(), EncodeError> {
        self.reset();
        let mut em = Emitter { enc: self, sink };
        match root {
            Root::Value(v) => {
                em.hoist(v, 0)?;
                em.write_value(v, 0)?;
            }
            Root::Item(item) => {
                em.hoist_item(item, 0)?;
                em.write_item(item, 0)?;
            }
        }
        em.simple(Tag::End)?;
        em.flush()
    }
}

/// One encode session: the encoder plus an optional streaming sink.
pub(crate) struct Emitter<'e, 's> {
    enc: &'e mut Encoder,
    sink: Option<&'s mut dyn BlockSink>,
}

fn len_width(tag: Tag) -> u8 {
    match tag.payload() {
        PayloadKind::UInt(w) | PayloadKind::Len(w) => w,
        _ => 0,
    }
}

impl Emitter<'_, '_> {
    pub(crate) fn max_depth(&self) -> usize {
        self.enc.config.max_depth
    }

    pub(crate) fn alloc_block(&mut self) -> u64 {
        let b = self.enc.blocks;
        self.enc.blocks += 1;
        b
    }

    fn unit(&mut self) -> Result<(), EncodeError> {
        if self.sink.is_none() {
            return Ok(());
        }
        self.enc.chunk_units += 1;
        if self.enc.chunk_units >= self.enc.config.chunk_blocks.max(1) {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), EncodeError> {
        let Some(sink) = self.sink.as_mut() else {
            return Ok(());
        };
        let bytes = self.enc.buf.as_slice();
        if self.enc.chunk_start < bytes.len() {
            sink.on_blocks_ready(&bytes[self.enc.chunk_start..])?;
        }
        self.enc.chunk_start = bytes.len();
        self.enc.chunk_units = 0;
        Ok(())
    }

    /// Writes a payload-free tag.
    pub(crate) fn simple(&mut self, tag: Tag) -> Result<(), EncodeError> {
        self.enc.buf.write_u8(tag.byte())?;
        self.unit()
    }

    /// Writes a tag with address-width operands, widening the address space first if needed.
    pub(crate) fn operands(&mut self, tag: Tag, ops: &[u64]) -> Result<(), EncodeError> {
        let widest = ops.iter().copied().max().unwrap_or(0);
        let need = format::address_width(widest);
        if need > self.enc.address_width {
            self.enc.buf.write_u8(Tag::Address.byte())?;
            self.enc.buf.write_u8(need)?;
            self.enc.address_width = need;
            self.unit()?;
        }
        self.enc.buf.write_u8(tag.byte())?;
        for op in ops {
            self.enc.buf.write_uint_le(*op, self.enc.address_width)?;
        }
        self.unit()
    }

    fn magnitude(&mut self, tag_for: fn(u8) -> Tag, magnitude: u64) -> Result<(), EncodeError> {
        let width = format::min_width(magnitude);
        let tag = tag_for(width);
        self.enc.buf.write_u8(tag.byte())?;
        if matches!(tag.payload(), PayloadKind::UIntN) {
            self.enc.buf.write_u8(width)?;
        }
        self.enc.buf.write_uint_le(magnitude, width)?;
        self.unit()
    }

    fn reference(&mut self, block: u64) -> Result<(), EncodeError> {
        self.magnitude(Tag::ref_for_width, block)
    }

    fn literal(&mut self, v: &Value) -> Result<u64, EncodeError> {
        match v {
            Value::Null => self.simple(Tag::Null)?,
            Value::Undefined => self.simple(Tag::Undefined)?,
            Value::Bool(true) => self.simple(Tag::True)?,
            Value::Bool(false) => self.simple(Tag::False)?,
            Value::Int(i) if *i >= 0 => self.magnitude(Tag::uint_for_width, i.unsigned_abs())?,
            Value::Int(i) => self.magnitude(Tag::int_for_width, i.unsigned_abs())?,
            Value::Float(f) => {
                self.enc.buf.write_u8(Tag::Float64.byte())?;
                self.enc.buf.write_f64_le(*f)?;
                self.unit()?;
            }
            Value::String(s) => {
                let len = s.len() as u64;
                let tag = Tag::str_for_len(len);
                self.enc.buf.write_u8(tag.byte())?;
                self.enc.buf.write_uint_le(len, len_width(tag))?;
                self.enc.buf.write_bytes(s.as_bytes())?;
                self.unit()?;
            }
            Value::Bytes(b) => {
                let len = b.len() as u64;
                let tag = Tag::bin_for_len(len).ok_or(EncodeError::BytesTooBig { len })?;
                self.enc.buf.write_u8(tag.byte())?;
                self.enc.buf.write_uint_le(len, len_width(tag))?;
                self.enc.buf.write_bytes(b)?;
                self.unit()?;
            }
            Value::Array(_) | Value::Object(_) | Value::Custom(_) => {
                return Err(EncodeError::UnsupportedValue {
                    type_name: v.kind().name(),
                });
            }
        }
        let block = self.alloc_block();
        self.enc.interns.insert(v, block);
        Ok(block)
    }

    /// Writes `v` in data position and returns the block it lives in.
    pub(crate) fn write_value(&mut self, v: &Value, depth: usize) -> Result<u64, EncodeError> {
        match v {
            Value::Array(items) => self.write_array(items, depth),
            Value::Object(map) => self.write_object(map, depth),
            Value::Custom(c) => self.write_custom(c),
            other => match self.enc.interns.get(other) {
                Some(block) => {
                    self.reference(block)?;
                    Ok(block)
                }
                None => self.literal(other),
            },
        }
    }

    /// Returns a block holding `v` for use as a program operand.
    ///
    /// Interned primitives are not re-emitted; anything else is written in full.
    pub(crate) fn block_of(&mut self, v: &Value, depth: usize) -> Result<u64, EncodeError> {
        if v.is_primitive() {
            return match self.enc.interns.get(v) {
                Some(block) => Ok(block),
                None => self.literal(v),
            };
        }
        self.hoist(v, depth)?;
        self.write_value(v, depth)
    }

    fn open_sized(&mut self, len: u64, depth: usize) -> Result<(), EncodeError> {
        let max = self.max_depth();
        if depth >= max {
            return Err(EncodeError::TooDeep { max });
        }
        let tag = Tag::array_for_len(len).ok_or(EncodeError::ArrayTooBig { len })?;
        self.enc.buf.write_u8(tag.byte())?;
        self.enc.buf.write_uint_le(len, len_width(tag))?;
        self.unit()
    }

    fn close(&mut self, tag: Tag) -> Result<u64, EncodeError> {
        self.simple(tag)?;
        Ok(self.alloc_block())
    }

    fn write_array(&mut self, items: &[Value], depth: usize) -> Result<u64, EncodeError> {
        self.open_sized(items.len() as u64, depth)?;
        for item in items {
            self.write_value(item, depth + 1)?;
        }
        self.close(Tag::ArrayEnd)
    }

    fn write_object(&mut self, map: &Map, depth: usize) -> Result<u64, EncodeError> {
        let max = self.max_depth();
        if depth >= max {
            return Err(EncodeError::TooDeep { max });
        }
        self.simple(Tag::ObjectStart)?;
        for (k, v) in map {
            self.write_key(k)?;
            self.write_value(v, depth + 1)?;
        }
        self.close(Tag::ObjectEnd)
    }

    fn write_key(&mut self, key: &str) -> Result<(), EncodeError> {
        match self.enc.interns.get_str(key) {
            Some(block) => self.reference(block),
            None => self.literal(&Value::String(key.to_string())).map(|_| ()),
        }
    }

    fn write_custom(&mut self, c: &Custom) -> Result<u64, EncodeError> {
        let (code, args) = self
            .enc
            .hoisted
            .get(&c.identity())
            .map(|(_, code, args)| (*code, *args))
            .ok_or(EncodeError::UnsupportedValue {
                type_name: c.type_name(),
            })?;
        self.operands(Tag::Constructor, &[code, args])?;
        Ok(self.alloc_block())
    }

    /// Emits the code and argument blocks for every custom value inside `v`.
    ///
    /// Must run while no container is open, so the emitted blocks stay out of container
    /// contents.
    pub(crate) fn hoist(&mut self, v: &Value, depth: usize) -> Result<(), EncodeError> {
        if !matches!(v, Value::Array(_) | Value::Object(_) | Value::Custom(_)) {
            return Ok(());
        }
        // Every arm opens a container at `depth`, matching `open_sized`.
        let max = self.max_depth();
        if depth >= max {
            return Err(EncodeError::TooDeep { max });
        }
        match v {
            Value::Array(items) => {
                for item in items {
                    self.hoist(item, depth + 1)?;
                }
            }
            Value::Object(map) => {
                for item in map.values() {
                    self.hoist(item, depth + 1)?;
                }
            }
            Value::Custom(c) => {
                if self.enc.hoisted.contains_key(&c.identity()) {
                    return Ok(());
                }
                let registry = Arc::clone(&self.enc.config.registry);
                let unsupported = EncodeError::UnsupportedValue {
                    type_name: c.type_name(),
                };
                let Some(ctor) = registry.lookup_value(c) else {
                    return Err(unsupported);
                };
                let args = ctor.args(c).ok_or(unsupported)?;
                for arg in &args {
                    self.hoist(arg, depth + 1)?;
                }
                let code = self.block_of(&Value::Int(i64::from(ctor.code())), depth)?;
                let args = self.write_array(&args, depth)?;
                self.enc.hoisted.insert(c.identity(), (c.clone(), code, args));
            }
            _ => {}
        }
        Ok(())
    }

    fn hoist_item(&mut self, item: &Item, depth: usize) -> Result<(), EncodeError> {
        match item {
            Item::Value(v) => self.hoist(v, depth),
            Item::Array(items) => {
                for item in items {
                    self.hoist_item(item, depth + 1)?;
                }
                Ok(())
            }
            Item::Program(_) => Ok(()),
        }
    }

    fn write_item(&mut self, item: &Item, depth: usize) -> Result<u64, EncodeError> {
        match item {
            Item::Value(v) => self.write_value(v, depth),
            Item::Array(items) => {
                self.open_sized(items.len() as u64, depth)?;
                for item in items {
                    self.write_item(item, depth + 1)?;
                }
                self.close(Tag::ArrayEnd)
            }
            Item::Program(p) => program::compile(self, p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::Date;

    fn encode(v: &Value) -> Vec<u8> {
        Encoder::default().serialize(v).unwrap()
    }

    #[test]
    fn primitive_layouts() {
        assert_eq!(encode(&Value::Null), [0x00, 0xFF]);
        assert_eq!(encode(&Value::Int(255)), [0x02, 0xFF, 0xFF]);
        assert_eq!(encode(&Value::Int(256)), [0x03, 0x00, 0x01, 0xFF]);
        assert_eq!(encode(&Value::Int(-1)), [0x09, 0x01, 0xFF]);
        assert_eq!(
            encode(&Value::Int(i64::MAX)),
            [0x08, 8, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F, 0xFF]
        );
        assert_eq!(encode(&Value::from("hi")), [0x11, 2, b'h', b'i', 0xFF]);
        assert_eq!(encode(&Value::Bytes(vec![9])), [0x15, 1, 9, 0xFF]);
    }

    #[test]
    fn repeated_primitives_become_refs() {
        let bytes = encode(&Value::Array(vec!["same".into(), "same".into()]));
        assert_eq!(
            bytes,
            [0x22, 2, 0x11, 4, b's', b'a', b'm', b'e', 0x18, 0, 0x26, 0xFF]
        );
    }

    #[test]
    fn object_keys_are_interned() {
        let v: Value = [("k", Value::from("k"))].into_iter().collect();
        assert_eq!(encode(&v), [0x27, 0x11, 1, b'k', 0x18, 0, 0x29, 0xFF]);
    }

    #[test]
    fn custom_operands_precede_the_container() {
        let date = Value::Custom(Custom::new(Date { millis: 0.0 }));
        let bytes = encode(&Value::Array(vec![date]));
        let mut expected = vec![0x02, 0x00, 0x22, 1, 0x10];
        expected.extend_from_slice(&0.0_f64.to_le_bytes());
        expected.extend_from_slice(&[0x26, 0x22, 1, 0x2A, 0, 2, 0x26, 0xFF]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn unregistered_customs_fail() {
        #[derive(Debug, PartialEq)]
        struct Opaque;
        let err = Encoder::default()
            .serialize(&Value::Custom(Custom::new(Opaque)))
            .unwrap_err();
        assert!(matches!(err, EncodeError::UnsupportedValue { .. }));
        assert!(err.to_string().contains("Opaque"));
    }

    #[test]
    fn fixed_buffer_overflow() {
        let mut enc = Encoder::new(EncoderConfig {
            initial_capacity: 4,
            growth: Growth::Fixed,
            ..EncoderConfig::default()
        });
        let err = enc.serialize(&Value::from("too long")).unwrap_err();
        assert_eq!(
            err,
            EncodeError::BufferOverflow(BufferOverflow {
                capacity: 4,
                needed: 10
            })
        );
        assert_eq!(enc.serialize(&Value::Int(1)), Ok(vec![0x02, 1, 0xFF]));
    }

    #[test]
    fn depth_limit() {
        let mut v = Value::Null;
        for _ in 0..5 {
            v = Value::Array(vec![v]);
        }
        let mut enc = Encoder::new(EncoderConfig {
            max_depth: 4,
            ..EncoderConfig::default()
        });
        assert_eq!(enc.serialize(&v), Err(EncodeError::TooDeep { max: 4 }));
    }

    #[test]
    fn depth_limit_is_the_same_for_customs() {
        let date = || Value::Custom(Custom::new(Date { millis: 1.0 }));
        let mut enc = Encoder::new(EncoderConfig {
            max_depth: 2,
            ..EncoderConfig::default()
        });
        assert!(enc.serialize(&Value::Array(vec![Value::Array(vec![Value::Int(1)])])).is_ok());
        assert!(enc.serialize(&Value::Array(vec![date()])).is_ok());
        assert_eq!(
            enc.serialize(&Value::Array(vec![Value::Array(vec![Value::Array(vec![])])])),
            Err(EncodeError::TooDeep { max: 2 })
        );
        assert_eq!(
            enc.serialize(&Value::Array(vec![Value::Array(vec![date()])])),
            Err(EncodeError::TooDeep { max: 2 })
        );
    }

    #[test]
    fn customs_built_during_hoisting_keep_their_own_blocks() {
        #[derive(Debug, PartialEq)]
        struct Born(f64);

        let mut registry = Registry::with_builtins();
        registry
            .register::<Born, _, _>(
                9,
                |b| vec![Value::Custom(Custom::new(Date { millis: b.0 }))],
                |args| match args.as_slice() {
                    [Value::Custom(c)] => c.downcast_ref::<Date>().map(|d| Born(d.millis)),
                    _ => None,
                },
            )
            .unwrap();
        let registry = Arc::new(registry);
        let v = Value::Array(
            (0..4_i32)
                .map(|i| Value::Custom(Custom::new(Born(f64::from(i)))))
                .collect(),
        );
        let bytes = Encoder::new(EncoderConfig {
            registry: Arc::clone(&registry),
            ..EncoderConfig::default()
        })
        .serialize(&v)
        .unwrap();
        let out = crate::Decoder::new(crate::decoder::DecoderConfig {
            registry,
            ..crate::decoder::DecoderConfig::default()
        })
        .deserialize(&bytes)
        .unwrap();
        assert_eq!(out, v);
    }

    #[test]
    fn streaming_chunks_are_whole_tags() {
        let v = Value::Array(vec![Value::from("ab"), Value::Int(300), Value::Null]);
        let full = encode(&v);

        let mut chunks: Vec<Vec<u8>> = Vec::new();
        let mut enc = Encoder::new(EncoderConfig {
            chunk_blocks: 2,
            ..EncoderConfig::default()
        });
        enc.serialize_streaming(&v, &mut |chunk: &[u8]| -> Result<(), SinkError> {
            chunks.push(chunk.to_vec());
            Ok(())
        })
        .unwrap();

        // array8, str8 | uint16, null | array_end, end
        assert_eq!(
            chunks,
            [
                vec![0x22, 3, 0x11, 2, b'a', b'b'],
                vec![0x03, 0x2C, 0x01, 0x00],
                vec![0x26, 0xFF],
            ]
        );
        assert_eq!(chunks.concat(), full);
    }

    #[test]
    fn sink_errors_abort() {
        let err = Encoder::default()
            .serialize_streaming(&Value::Null, &mut |_: &[u8]| -> Result<(), SinkError> {
                Err(SinkError::Other("closed".into()))
            })
            .unwrap_err();
        assert_eq!(err, EncodeError::Sink(SinkError::Other("closed".into())));
    }

    #[test]
    fn address_width_grows_with_block_count() {
        let mut em_enc = Encoder::default();
        let mut em = Emitter {
            enc: &mut em_enc,
            sink: None,
        };
        em.operands(Tag::Slot, &[0, 0x1FF]).unwrap();
        em.operands(Tag::Slot, &[1, 2]).unwrap();
        assert_eq!(
            em_enc.buf.as_slice(),
            &[0xFE, 2, 0x47, 0, 0, 0xFF, 0x01, 0x47, 1, 0, 2, 0]
        );
    }
}
