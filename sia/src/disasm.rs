// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Disassembler for Sia streams.
//!
//! [`disassemble`] produces a structured view ([`Disassembly`], [`Line`]) with one line per tag,
//! the block index each tag produces, and nesting depth. [`core::fmt::Display`] renders it as
//! text:
//!
//! ```text
//! 0000        array8 len=2
//! 0002  #0      str8 "same"
//! 0008          ref8 #0
//! 000a  #1    array_end
//! 000b        end
//! ```

#![allow(clippy::module_name_repetitions, reason = "public API module")]

use core::fmt;

use crate::codec::{self, Payload};
use crate::decoder::DecodeError;
use crate::format::Reader;
use crate::tag::{OperandRole, Tag};

/// One disassembled tag.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    /// Byte offset of the tag.
    pub offset: usize,
    /// The tag.
    pub tag: Tag,
    /// Block index produced by the tag, if any.
    pub block: Option<u64>,
    /// Container and program nesting depth.
    pub depth: usize,
    /// Whether the tag sits inside a program (operands are registers there).
    pub in_program: bool,
    text: String,
}

impl Line {
    /// Returns the rendered payload (empty for payload-free tags).
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.text
    }
}

/// Disassembly of a stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Disassembly {
    lines: Vec<Line>,
    error: Option<DecodeError>,
}

impl Disassembly {
    /// Returns the decoded lines.
    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Returns the error that stopped disassembly, if any.
    #[must_use]
    pub fn error(&self) -> Option<&DecodeError> {
        self.error.as_ref()
    }
}

/// Disassembles `bytes`.
///
/// This is best-effort: decoding stops at the first malformed tag and the error is recorded in
/// the returned [`Disassembly`]. Structural errors (unbalanced containers, bad references) are
/// not checked.
#[must_use]
pub fn disassemble(bytes: &[u8]) -> Disassembly {
    let mut out = Disassembly::default();
    let mut r = Reader::new(bytes);
    let mut address_width = 1;
    let mut blocks = 0_u64;
    let mut depth = 0_usize;
    let mut in_program = false;

    while !r.is_empty() {
        let unit = match codec::read_unit(&mut r, address_width) {
            Ok(unit) => unit,
            Err(e) => {
                out.error = Some(e);
                break;
            }
        };
        let tag = unit.tag;
        if closes(tag) {
            depth = depth.saturating_sub(1);
        }
        if tag == Tag::ProgramEnd {
            in_program = false;
        }
        let block = tag.produces_block().then(|| {
            blocks += 1;
            blocks - 1
        });
        out.lines.push(Line {
            offset: unit.offset,
            tag,
            block,
            depth,
            in_program,
            text: render_payload(tag, unit.payload, in_program),
        });
        if let Payload::Width(w) = unit.payload {
            address_width = w;
        }
        if tag == Tag::ProgramStart {
            in_program = true;
        }
        if opens(tag) {
            depth += 1;
        }
    }
    out
}

fn opens(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::ArrayStart
            | Tag::Array8
            | Tag::Array16
            | Tag::Array32
            | Tag::ObjectStart
            | Tag::ProgramStart
            | Tag::If
            | Tag::While
    )
}

fn closes(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::ArrayEnd | Tag::ObjectEnd | Tag::ProgramEnd | Tag::EndIf | Tag::EndWhile
    )
}

fn is_negative(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::Int8 | Tag::Int16 | Tag::Int24 | Tag::Int32 | Tag::Int40 | Tag::Int48 | Tag::IntN
    )
}

fn is_ref(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::Ref8 | Tag::Ref16 | Tag::Ref24 | Tag::Ref32 | Tag::Ref40 | Tag::Ref48 | Tag::RefN
    )
}

fn role_name(role: OperandRole) -> &'static str {
    match role {
        OperandRole::Dst => "dst",
        OperandRole::Src => "src",
        OperandRole::Lhs => "lhs",
        OperandRole::Rhs => "rhs",
        OperandRole::Test => "test",
        OperandRole::Block => "block",
        OperandRole::Target => "target",
        OperandRole::Code => "code",
        OperandRole::Args => "args",
    }
}

fn render_operand(role: OperandRole, v: u64) -> String {
    match role {
        OperandRole::Block | OperandRole::Code | OperandRole::Args => format!("#{v}"),
        OperandRole::Target => format!("@{v}"),
        _ => format!("r{v}"),
    }
}

fn render_payload(tag: Tag, payload: Payload<'_>, in_program: bool) -> String {
    match payload {
        Payload::None => String::new(),
        Payload::UInt(v) if is_ref(tag) => format!("#{v}"),
        Payload::UInt(v) if is_negative(tag) => format!("-{v}"),
        Payload::UInt(v) if matches!(tag, Tag::Array8 | Tag::Array16 | Tag::Array32) => {
            format!("len={v}")
        }
        Payload::UInt(v) => format!("{v}"),
        Payload::F64(v) => format!("{v:?}"),
        Payload::Str(s) => format!("{s:?}"),
        Payload::Bytes(b) => {
            let mut s = String::with_capacity(b.len() * 2 + 2);
            s.push_str("0x");
            for byte in b {
                s.push_str(&format!("{byte:02x}"));
            }
            s
        }
        Payload::Width(w) => format!("width={w}"),
        Payload::Operands(ops) => {
            // Outside programs, push operands name blocks.
            let data_push = !in_program && matches!(tag, Tag::ArrayPush | Tag::ObjectPush);
            tag.operand_roles()
                .iter()
                .zip(ops.as_slice())
                .map(|(role, v)| {
                    let operand = if data_push {
                        format!("#{v}")
                    } else {
                        render_operand(*role, *v)
                    };
                    format!("{}={operand}", role_name(*role))
                })
                .collect::<Vec<_>>()
                .join(" ")
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}  ", self.offset)?;
        match self.block {
            Some(b) => write!(f, "{:<6}", format!("#{b}"))?,
            None => write!(f, "{:6}", "")?,
        }
        write!(f, "{:width$}{}", "", self.tag.mnemonic(), width = self.depth * 2)?;
        if !self.text.is_empty() {
            write!(f, " {}", self.text)?;
        }
        Ok(())
    }
}

impl fmt::Display for Disassembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        if let Some(e) = &self.error {
            writeln!(f, "; error: {e}")?;
        }
        Ok(())
    }
}
