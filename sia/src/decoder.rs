// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decoding engine.
//!
//! The decoder is a tag-dispatch loop over [`Unit`]s. Every value-producing tag appends to the
//! block table and is also fed to the innermost open container; at top level it becomes the
//! candidate result. Between `program_start` and `program_end` the decoder collects
//! instructions instead, and runs them with [`vm::run`] when the program closes.
//!
//! Backreferences feed a value without producing a new block.

use core::fmt;
use std::sync::Arc;

use crate::codec::{self, Payload, Unit};
use crate::format::{FormatError, Reader};
use crate::registry::Registry;
use crate::tag::Tag;
use crate::trace::{TraceMask, TraceSink};
use crate::value::{Map, Value, ValueKind};
use crate::vm::{self, CompiledProgram, Instr, Limits, Reg, TrapInfo};

/// Upper bound on elements preallocated from a declared array length.
const PREALLOC_LIMIT: u64 = 4096;

/// A decode error.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodeError {
    /// Low-level read failure (truncation, bad UTF-8).
    Format(FormatError),
    /// An unassigned tag byte.
    UnsupportedType {
        /// The raw byte.
        tag: u8,
    },
    /// A counted integer claimed more than 8 bytes.
    IntTooWide {
        /// Claimed byte count.
        bytes: u8,
    },
    /// An integer magnitude did not fit `i64`.
    IntOutOfRange {
        /// Magnitude on the wire.
        magnitude: u64,
        /// Whether the tag was a negative-integer tag.
        negative: bool,
    },
    /// An `address` width outside `1..=8`.
    BadAddressWidth {
        /// Declared width.
        width: u8,
    },
    /// A block index past the end of the block table.
    RefOutOfBounds {
        /// Requested index.
        index: u64,
        /// Block table length.
        len: usize,
    },
    /// A constructor code with no registered builder.
    UnknownConstructor {
        /// Constructor code.
        code: u64,
    },
    /// A constructor code block that is not a non-negative integer.
    InvalidConstructorCode {
        /// Kind of the code block.
        kind: ValueKind,
    },
    /// A constructor argument block that is not an array.
    InvalidConstructorArgs {
        /// Kind of the argument block.
        kind: ValueKind,
    },
    /// A registered builder rejected its arguments.
    ConstructorFailed {
        /// Constructor code.
        code: u64,
    },
    /// A non-string object key.
    InvalidKey {
        /// Kind of the offending key.
        kind: ValueKind,
    },
    /// An object closed after a key without its value.
    DanglingKey,
    /// A closing or pushing tag that does not match the innermost open construct.
    MalformedNesting {
        /// The offending tag.
        tag: Tag,
    },
    /// A closing tag with nothing open.
    UnmatchedEnd {
        /// The offending tag.
        tag: Tag,
    },
    /// `end` (or `program_end`) while a container or program is still open.
    UnclosedContainer,
    /// A sized array closed with a different number of elements.
    LengthMismatch {
        /// Declared length.
        expected: u64,
        /// Elements received.
        actual: u64,
    },
    /// Containers or program blocks nested deeper than the configured limit.
    TooDeep {
        /// Configured maximum depth.
        max: usize,
    },
    /// `program_start` inside a program.
    NestedProgram,
    /// A program-only tag outside a program.
    NotInProgram {
        /// The offending tag.
        tag: Tag,
    },
    /// A register operand at or past the configured maximum.
    TooManyRegisters {
        /// Register operand.
        reg: u64,
        /// Configured maximum register count.
        max: u32,
    },
    /// `end` with no value decoded.
    EmptyStream,
    /// Bytes after the `end` sentinel.
    TrailingBytes {
        /// Number of unread bytes.
        count: usize,
    },
    /// A program trapped.
    Trap(TrapInfo),
    /// Input offered after the stream already ended.
    AlreadyEnded,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(e) => write!(f, "{e}"),
            Self::UnsupportedType { tag } => write!(f, "Unsupported type: {tag}"),
            Self::IntTooWide { bytes } => write!(f, "integer of {bytes} bytes is too wide"),
            Self::IntOutOfRange {
                magnitude,
                negative,
            } => {
                let sign = if *negative { "-" } else { "" };
                write!(f, "integer {sign}{magnitude} does not fit in 64 bits")
            }
            Self::BadAddressWidth { width } => write!(f, "invalid address width {width}"),
            Self::RefOutOfBounds { index, len } => {
                write!(f, "ref {index} out of bounds (block table has {len})")
            }
            Self::UnknownConstructor { code } => write!(f, "Constructor {code} is unknown"),
            Self::InvalidConstructorCode { kind } => {
                write!(f, "constructor code must be a non-negative int, got {kind}")
            }
            Self::InvalidConstructorArgs { kind } => {
                write!(f, "constructor arguments must be an array, got {kind}")
            }
            Self::ConstructorFailed { code } => {
                write!(f, "constructor {code} rejected its arguments")
            }
            Self::InvalidKey { kind } => write!(f, "Key of type {kind} is invalid"),
            Self::DanglingKey => write!(f, "object closed after a key without a value"),
            Self::MalformedNesting { tag } => {
                write!(f, "{} does not match the innermost open block", tag.mnemonic())
            }
            Self::UnmatchedEnd { tag } => write!(f, "{} with nothing open", tag.mnemonic()),
            Self::UnclosedContainer => write!(f, "stream ended with an open container"),
            Self::LengthMismatch { expected, actual } => {
                write!(f, "array declared {expected} elements, got {actual}")
            }
            Self::TooDeep { max } => write!(f, "nesting deeper than {max}"),
            Self::NestedProgram => write!(f, "program started inside a program"),
            Self::NotInProgram { tag } => {
                write!(f, "{} outside a program", tag.mnemonic())
            }
            Self::TooManyRegisters { reg, max } => {
                write!(f, "register r{reg} exceeds the limit of {max}")
            }
            Self::EmptyStream => write!(f, "stream ended without a value"),
            Self::TrailingBytes { count } => write!(f, "{count} bytes after end of stream"),
            Self::Trap(t) => write!(f, "{t}"),
            Self::AlreadyEnded => write!(f, "stream already ended"),
        }
    }
}

impl core::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Format(e) => Some(e),
            Self::Trap(t) => Some(t),
            _ => None,
        }
    }
}

impl From<FormatError> for DecodeError {
    fn from(e: FormatError) -> Self {
        Self::Format(e)
    }
}

impl From<TrapInfo> for DecodeError {
    fn from(t: TrapInfo) -> Self {
        Self::Trap(t)
    }
}

/// Decoder configuration.
#[derive(Clone, Debug)]
pub struct DecoderConfig {
    /// Constructors for custom values.
    pub registry: Arc<Registry>,
    /// Limits for embedded programs.
    pub limits: Limits,
    /// Maximum nesting of containers, and separately of program blocks.
    pub max_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            registry: Arc::new(Registry::with_builtins()),
            limits: Limits::default(),
            max_depth: 1024,
        }
    }
}

/// Progress of a streaming decode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StreamStatus {
    /// More input is expected.
    Pending,
    /// The `end` sentinel was applied; the result is available.
    Ended,
}

#[derive(Debug)]
enum Builder {
    Array {
        expected: Option<u64>,
        items: Vec<Value>,
    },
    Object {
        map: Map,
        key: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FrameKind {
    Program,
    If,
    While,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    cond: Vec<Instr>,
    test: Option<Reg>,
    body: Vec<Instr>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            cond: Vec::new(),
            test: None,
            body: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct ProgramBuild {
    container_base: usize,
    frames: Vec<Frame>,
    register_count: u32,
    has_push: bool,
}

type EndCallback = Box<dyn FnMut(&Value)>;

/// Sia decoder.
///
/// A decoder is stateful. [`Decoder::deserialize`] starts a fresh session each call; the
/// streaming entry point [`Decoder::deserialize_blocks`] keeps its state across calls until the
/// `end` sentinel, after which [`Decoder::reset`] starts a new session.
pub struct Decoder {
    config: DecoderConfig,
    blocks: Vec<Value>,
    stack: Vec<Builder>,
    program: Option<ProgramBuild>,
    address_width: u8,
    last: Option<Value>,
    result: Option<Value>,
    ended: bool,
    pending: Vec<u8>,
    on_end: Option<EndCallback>,
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("blocks", &self.blocks.len())
            .field("depth", &self.stack.len())
            .field("in_program", &self.program.is_some())
            .field("address_width", &self.address_width)
            .field("ended", &self.ended)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

impl Decoder {
    /// Creates a decoder.
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            blocks: Vec::new(),
            stack: Vec::new(),
            program: None,
            address_width: 1,
            last: None,
            result: None,
            ended: false,
            pending: Vec::new(),
            on_end: None,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Returns the block table of the current session.
    #[must_use]
    pub fn blocks(&self) -> &[Value] {
        &self.blocks
    }

    /// Sets a callback invoked once per streaming session with the final value.
    pub fn set_on_end(&mut self, f: impl FnMut(&Value) + 'static) {
        self.on_end = Some(Box::new(f));
    }

    /// Takes the result of an ended streaming session.
    pub fn take_result(&mut self) -> Option<Value> {
        self.result.take()
    }

    /// Clears all session state. The configuration and `on_end` callback are kept.
    pub fn reset(&mut self) {
        self.blocks.clear();
        self.stack.clear();
        self.program = None;
        self.address_width = 1;
        self.last = None;
        self.result = None;
        self.ended = false;
        self.pending.clear();
    }

    /// Decodes a complete stream.
    pub fn deserialize(&mut self, bytes: &[u8]) -> Result<Value, DecodeError> {
        self.deserialize_with_trace(bytes, TraceMask::NONE, None)
    }

    /// Decodes a complete stream, reporting events requested by `trace_mask` to `trace`.
    pub fn deserialize_with_trace(
        &mut self,
        bytes: &[u8],
        trace_mask: TraceMask,
        mut trace: Option<&mut dyn TraceSink>,
    ) -> Result<Value, DecodeError> {
        self.reset();
        let mut r = Reader::new(bytes);
        while !self.ended {
            let unit = codec::read_unit(&mut r, self.address_width)?;
            self.step(unit, trace_mask, &mut trace)?;
        }
        let count = bytes.len() - r.offset();
        if count != 0 {
            return Err(DecodeError::TrailingBytes { count });
        }
        self.result.take().ok_or(DecodeError::EmptyStream)
    }

    /// Feeds `chunk` to a streaming session and applies at most `max_blocks` tags.
    ///
    /// A tag whose payload is not complete yet stays buffered until a later call supplies the
    /// rest. Once `end` is applied the `on_end` callback runs and the result is available from
    /// [`Decoder::take_result`].
    pub fn deserialize_blocks(
        &mut self,
        chunk: &[u8],
        max_blocks: usize,
    ) -> Result<StreamStatus, DecodeError> {
        self.deserialize_blocks_with_trace(chunk, max_blocks, TraceMask::NONE, None)
    }

    /// Like [`Decoder::deserialize_blocks`], with tracing.
    pub fn deserialize_blocks_with_trace(
        &mut self,
        chunk: &[u8],
        max_blocks: usize,
        trace_mask: TraceMask,
        mut trace: Option<&mut dyn TraceSink>,
    ) -> Result<StreamStatus, DecodeError> {
        if self.ended {
            return Err(DecodeError::AlreadyEnded);
        }
        let mut buf = core::mem::take(&mut self.pending);
        buf.extend_from_slice(chunk);

        let mut r = Reader::new(&buf);
        let mut consumed = 0;
        let mut applied = 0;
        let outcome = loop {
            if self.ended || applied >= max_blocks {
                break Ok(());
            }
            match codec::read_unit(&mut r, self.address_width) {
                Ok(unit) => {
                    if let Err(e) = self.step(unit, trace_mask, &mut trace) {
                        break Err(e);
                    }
                    consumed = r.offset();
                    applied += 1;
                }
                Err(DecodeError::Format(FormatError::UnexpectedEof)) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        buf.drain(..consumed);
        self.pending = buf;
        outcome?;

        if !self.ended {
            return Ok(StreamStatus::Pending);
        }
        if let Some(cb) = self.on_end.as_mut()
            && let Some(v) = self.result.as_ref()
        {
            cb(v);
        }
        Ok(StreamStatus::Ended)
    }

    fn step(
        &mut self,
        unit: Unit<'_>,
        trace_mask: TraceMask,
        trace: &mut Option<&mut dyn TraceSink>,
    ) -> Result<(), DecodeError> {
        self.apply(unit, trace_mask, trace)?;
        if trace_mask.contains(TraceMask::BLOCK)
            && let Some(t) = trace.as_mut()
        {
            let block = unit
                .tag
                .produces_block()
                .then(|| self.blocks.len() as u64 - 1);
            t.block(unit.offset, unit.tag, block);
        }
        Ok(())
    }

    fn apply(
        &mut self,
        unit: Unit<'_>,
        trace_mask: TraceMask,
        trace: &mut Option<&mut dyn TraceSink>,
    ) -> Result<(), DecodeError> {
        let tag = unit.tag;
        let ops = unit.operands();
        match tag {
            Tag::Null => self.produce(Value::Null),
            Tag::Undefined => self.produce(Value::Undefined),
            Tag::True => self.produce(Value::Bool(true)),
            Tag::False => self.produce(Value::Bool(false)),
            Tag::UInt8
            | Tag::UInt16
            | Tag::UInt24
            | Tag::UInt32
            | Tag::UInt40
            | Tag::UInt48
            | Tag::UIntN => self.produce(Value::Int(int_from(unit.uint(), false)?)),
            Tag::Int8
            | Tag::Int16
            | Tag::Int24
            | Tag::Int32
            | Tag::Int40
            | Tag::Int48
            | Tag::IntN => self.produce(Value::Int(int_from(unit.uint(), true)?)),
            Tag::Float64 => match unit.payload {
                Payload::F64(v) => self.produce(Value::Float(v)),
                _ => Err(DecodeError::MalformedNesting { tag }),
            },
            Tag::Str8 | Tag::Str16 | Tag::Str32 | Tag::Str64 => match unit.payload {
                Payload::Str(s) => self.produce(Value::String(s.to_string())),
                _ => Err(DecodeError::MalformedNesting { tag }),
            },
            Tag::Bin8 | Tag::Bin16 | Tag::Bin32 => match unit.payload {
                Payload::Bytes(b) => self.produce(Value::Bytes(b.to_vec())),
                _ => Err(DecodeError::MalformedNesting { tag }),
            },
            Tag::Ref8
            | Tag::Ref16
            | Tag::Ref24
            | Tag::Ref32
            | Tag::Ref40
            | Tag::Ref48
            | Tag::RefN => {
                let v = self.block(unit.uint())?.clone();
                self.feed(v)
            }
            Tag::ArrayStart => self.open(Builder::Array {
                expected: None,
                items: Vec::new(),
            }),
            Tag::Array8 | Tag::Array16 | Tag::Array32 => {
                let len = unit.uint();
                let cap = usize::try_from(len.min(PREALLOC_LIMIT)).unwrap_or_default();
                self.open(Builder::Array {
                    expected: Some(len),
                    items: Vec::with_capacity(cap),
                })
            }
            Tag::ArrayPush if self.program.is_some() => {
                let src = self.reg(ops.get(0))?;
                self.push_instr(tag, Instr::Push { src })
            }
            Tag::ArrayPush | Tag::ObjectPush => {
                let v = self.block(ops.get(0))?.clone();
                let want_array = tag == Tag::ArrayPush;
                let fits = match self.open_builder() {
                    Some(Builder::Array { .. }) => want_array,
                    Some(Builder::Object { .. }) => !want_array,
                    None => false,
                };
                if fits {
                    self.feed(v)
                } else {
                    Err(DecodeError::MalformedNesting { tag })
                }
            }
            Tag::ArrayEnd | Tag::ObjectEnd => self.close(tag),
            Tag::ObjectStart => self.open(Builder::Object {
                map: Map::new(),
                key: None,
            }),
            Tag::Constructor => {
                let v = self.construct(ops.get(0), ops.get(1))?;
                self.produce(v)
            }
            Tag::ProgramStart => {
                if self.program.is_some() {
                    return Err(DecodeError::NestedProgram);
                }
                self.program = Some(ProgramBuild {
                    container_base: self.stack.len(),
                    frames: vec![Frame::new(FrameKind::Program)],
                    register_count: 0,
                    has_push: false,
                });
                Ok(())
            }
            Tag::ProgramEnd => {
                let v = self.finish_program(trace_mask, trace)?;
                self.produce(v)
            }
            Tag::If | Tag::While => {
                let max = self.config.max_depth;
                let p = self.program_mut(tag)?;
                if p.frames.len() > max {
                    return Err(DecodeError::TooDeep { max });
                }
                let kind = if tag == Tag::If {
                    FrameKind::If
                } else {
                    FrameKind::While
                };
                p.frames.push(Frame::new(kind));
                Ok(())
            }
            Tag::Test => {
                let reg = self.reg(ops.get(0))?;
                let p = self.program_mut(tag)?;
                match p.frames.last_mut() {
                    Some(frame) if frame.kind != FrameKind::Program && frame.test.is_none() => {
                        frame.test = Some(reg);
                        Ok(())
                    }
                    _ => Err(DecodeError::MalformedNesting { tag }),
                }
            }
            Tag::EndIf | Tag::EndWhile => {
                let want = if tag == Tag::EndIf {
                    FrameKind::If
                } else {
                    FrameKind::While
                };
                let p = self.program_mut(tag)?;
                let closes = p
                    .frames
                    .last()
                    .is_some_and(|f| f.kind == want && f.test.is_some());
                let frame = if closes { p.frames.pop() } else { None };
                let Some(Frame {
                    cond,
                    test: Some(test),
                    body,
                    ..
                }) = frame
                else {
                    return Err(DecodeError::MalformedNesting { tag });
                };
                let instr = if want == FrameKind::If {
                    Instr::If { cond, test, body }
                } else {
                    Instr::While { cond, test, body }
                };
                self.push_instr(tag, instr)
            }
            Tag::Slot => {
                let dst = self.reg(ops.get(0))?;
                let block = ops.get(1);
                self.block(block)?;
                self.push_instr(tag, Instr::Slot { dst, block })
            }
            Tag::Mov => {
                let instr = Instr::Mov {
                    dst: self.reg(ops.get(0))?,
                    src: self.reg(ops.get(1))?,
                };
                self.push_instr(tag, instr)
            }
            Tag::IsBigger => {
                let instr = Instr::IsBigger {
                    dst: self.reg(ops.get(0))?,
                    lhs: self.reg(ops.get(1))?,
                    rhs: self.reg(ops.get(2))?,
                };
                self.push_instr(tag, instr)
            }
            Tag::AddTo => {
                let instr = Instr::AddTo {
                    dst: self.reg(ops.get(0))?,
                    src: self.reg(ops.get(1))?,
                };
                self.push_instr(tag, instr)
            }
            Tag::Mul => {
                let instr = Instr::Mul {
                    dst: self.reg(ops.get(0))?,
                    lhs: self.reg(ops.get(1))?,
                    rhs: self.reg(ops.get(2))?,
                };
                self.push_instr(tag, instr)
            }
            Tag::Sin => {
                let instr = Instr::Sin {
                    dst: self.reg(ops.get(0))?,
                    src: self.reg(ops.get(1))?,
                };
                self.push_instr(tag, instr)
            }
            Tag::Jump => {
                let target = u32::try_from(ops.get(0)).unwrap_or(u32::MAX);
                self.push_instr(tag, Instr::Jump { target })
            }
            Tag::Exit => self.push_instr(tag, Instr::Exit),
            Tag::Address => {
                if let Payload::Width(w) = unit.payload {
                    self.address_width = w;
                }
                Ok(())
            }
            Tag::End => self.finish(),
        }
    }

    fn block(&self, index: u64) -> Result<&Value, DecodeError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.blocks.get(i))
            .ok_or(DecodeError::RefOutOfBounds {
                index,
                len: self.blocks.len(),
            })
    }

    fn container_base(&self) -> usize {
        self.program.as_ref().map_or(0, |p| p.container_base)
    }

    fn open_builder(&self) -> Option<&Builder> {
        if self.stack.len() > self.container_base() {
            self.stack.last()
        } else {
            None
        }
    }

    fn produce(&mut self, v: Value) -> Result<(), DecodeError> {
        self.blocks.push(v.clone());
        self.feed(v)
    }

    fn feed(&mut self, v: Value) -> Result<(), DecodeError> {
        if self.stack.len() <= self.container_base() {
            if self.program.is_none() {
                self.last = Some(v);
            }
            return Ok(());
        }
        match self.stack.last_mut() {
            Some(Builder::Array { expected, items }) => {
                if let Some(n) = *expected
                    && items.len() as u64 >= n
                {
                    return Err(DecodeError::LengthMismatch {
                        expected: n,
                        actual: n + 1,
                    });
                }
                items.push(v);
            }
            Some(Builder::Object { map, key }) => match key.take() {
                Some(k) => {
                    map.insert(k, v);
                }
                None => match v {
                    Value::String(s) => *key = Some(s),
                    other => return Err(DecodeError::InvalidKey { kind: other.kind() }),
                },
            },
            None => {}
        }
        Ok(())
    }

    fn open(&mut self, builder: Builder) -> Result<(), DecodeError> {
        let max = self.config.max_depth;
        if self.stack.len() >= max {
            return Err(DecodeError::TooDeep { max });
        }
        self.stack.push(builder);
        Ok(())
    }

    fn close(&mut self, tag: Tag) -> Result<(), DecodeError> {
        if self.stack.len() <= self.container_base() {
            return Err(DecodeError::UnmatchedEnd { tag });
        }
        let Some(builder) = self.stack.pop() else {
            return Err(DecodeError::UnmatchedEnd { tag });
        };
        let v = match (tag, builder) {
            (Tag::ArrayEnd, Builder::Array { expected, items }) => {
                let actual = items.len() as u64;
                if let Some(expected) = expected
                    && expected != actual
                {
                    return Err(DecodeError::LengthMismatch { expected, actual });
                }
                Value::Array(items)
            }
            (Tag::ObjectEnd, Builder::Object { map, key: None }) => Value::Object(map),
            (Tag::ObjectEnd, Builder::Object { key: Some(_), .. }) => {
                return Err(DecodeError::DanglingKey);
            }
            _ => return Err(DecodeError::MalformedNesting { tag }),
        };
        self.produce(v)
    }

    fn construct(&self, code_block: u64, args_block: u64) -> Result<Value, DecodeError> {
        let code = match self.block(code_block)? {
            Value::Int(c) => u64::try_from(*c).map_err(|_| DecodeError::InvalidConstructorCode {
                kind: ValueKind::Int,
            })?,
            other => return Err(DecodeError::InvalidConstructorCode { kind: other.kind() }),
        };
        let args = match self.block(args_block)? {
            Value::Array(items) => items.clone(),
            other => return Err(DecodeError::InvalidConstructorArgs { kind: other.kind() }),
        };
        let ctor = self
            .config
            .registry
            .lookup_code(code)
            .ok_or(DecodeError::UnknownConstructor { code })?;
        ctor.build(args)
            .ok_or(DecodeError::ConstructorFailed { code })
    }

    fn program_mut(&mut self, tag: Tag) -> Result<&mut ProgramBuild, DecodeError> {
        self.program
            .as_mut()
            .ok_or(DecodeError::NotInProgram { tag })
    }

    fn reg(&mut self, operand: u64) -> Result<Reg, DecodeError> {
        let max = self.config.limits.max_registers;
        let reg = u32::try_from(operand)
            .ok()
            .filter(|r| *r < max)
            .ok_or(DecodeError::TooManyRegisters { reg: operand, max })?;
        if let Some(p) = self.program.as_mut() {
            p.register_count = p.register_count.max(reg + 1);
        }
        Ok(reg)
    }

    fn push_instr(&mut self, tag: Tag, instr: Instr) -> Result<(), DecodeError> {
        let p = self.program_mut(tag)?;
        if matches!(instr, Instr::Push { .. }) {
            p.has_push = true;
        }
        let Some(frame) = p.frames.last_mut() else {
            return Err(DecodeError::NotInProgram { tag });
        };
        match (frame.kind, frame.test) {
            (FrameKind::Program, _) | (_, Some(_)) => frame.body.push(instr),
            (_, None) => frame.cond.push(instr),
        }
        Ok(())
    }

    fn finish_program(
        &mut self,
        trace_mask: TraceMask,
        trace: &mut Option<&mut dyn TraceSink>,
    ) -> Result<Value, DecodeError> {
        let tag = Tag::ProgramEnd;
        let base = self.container_base();
        let p = self.program_mut(tag)?;
        if p.frames.len() != 1 {
            return Err(DecodeError::MalformedNesting { tag });
        }
        if self.stack.len() != base {
            return Err(DecodeError::UnclosedContainer);
        }
        let Some(mut p) = self.program.take() else {
            return Err(DecodeError::NotInProgram { tag });
        };
        let Some(frame) = p.frames.pop() else {
            return Err(DecodeError::MalformedNesting { tag });
        };
        let program = CompiledProgram {
            instrs: frame.body,
            register_count: p.register_count,
            has_push: p.has_push,
        };
        let v = vm::run(
            &program,
            &self.blocks,
            &self.config.limits,
            trace_mask,
            trace,
        )?;
        Ok(v)
    }

    fn finish(&mut self) -> Result<(), DecodeError> {
        if self.program.is_some() || !self.stack.is_empty() {
            return Err(DecodeError::UnclosedContainer);
        }
        self.result = Some(self.last.take().ok_or(DecodeError::EmptyStream)?);
        self.ended = true;
        Ok(())
    }
}

fn int_from(magnitude: u64, negative: bool) -> Result<i64, DecodeError> {
    let wide = if negative {
        -i128::from(magnitude)
    } else {
        i128::from(magnitude)
    };
    i64::try_from(wide).map_err(|_| DecodeError::IntOutOfRange {
        magnitude,
        negative,
    })
}
