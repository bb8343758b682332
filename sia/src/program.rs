// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Program trees and their compilation to program tags.
//!
//! A [`Program`] is a list of [`Node`]s built with the helper functions in this module. Named
//! slots map to registers; labels name top-level instructions and can be the target of a
//! [`jump`].
//!
//! ```
//! use sia::program::{add_to, is_bigger, program, push, slot, var, while_, Item};
//!
//! let p = program([
//!     var("i", 0.0),
//!     var("one", 1.0),
//!     while_(is_bigger(3, slot("i")), [push(slot("i")), add_to(slot("i"), slot("one"))]),
//! ]);
//! let bytes = sia::Encoder::default().serialize_item(&Item::Program(p)).unwrap();
//! let out = sia::deserialize(&bytes).unwrap();
//! assert_eq!(out, sia::Value::Array(vec![0.0.into(), 1.0.into(), 2.0.into()]));
//! ```

use core::fmt;

use hashbrown::HashMap;

use crate::encoder::{EncodeError, Emitter};
use crate::tag::Tag;
use crate::value::Value;
use crate::vm::Reg;

/// A program expression or statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// A constant, loaded into a fresh register.
    Const(Value),
    /// A named slot. With a value it assigns; without one it reads.
    Var {
        /// Slot name.
        name: String,
        /// Assigned value.
        value: Option<Box<Node>>,
    },
    /// A label. With a body it names that top-level statement; without one it is a jump target.
    Line {
        /// Label name.
        name: String,
        /// Labeled statement.
        body: Option<Box<Node>>,
    },
    /// `lhs > rhs`.
    IsBigger(Box<Node>, Box<Node>),
    /// `lhs * rhs`.
    Mul(Box<Node>, Box<Node>),
    /// `sin(x)`.
    Sin(Box<Node>),
    /// `dst += src`.
    AddTo(Box<Node>, Box<Node>),
    /// Runs `body` once if `cond` is truthy.
    If {
        /// Condition.
        cond: Box<Node>,
        /// Body.
        body: Vec<Node>,
    },
    /// Runs `body` while `cond` is truthy.
    While {
        /// Condition.
        cond: Box<Node>,
        /// Body.
        body: Vec<Node>,
    },
    /// Jumps to a label.
    Jump(Box<Node>),
    /// Stops the program.
    Exit,
    /// Appends a value to the program's result array.
    Push(Box<Node>),
}

impl Node {
    fn name(&self) -> &'static str {
        match self {
            Self::Const(_) => "const",
            Self::Var { .. } => "var",
            Self::Line { .. } => "line",
            Self::IsBigger(..) => "is_bigger",
            Self::Mul(..) => "mul",
            Self::Sin(_) => "sin",
            Self::AddTo(..) => "add_to",
            Self::If { .. } => "if",
            Self::While { .. } => "while",
            Self::Jump(_) => "jump",
            Self::Exit => "exit",
            Self::Push(_) => "push",
        }
    }
}

impl From<Value> for Node {
    fn from(v: Value) -> Self {
        Self::Const(v)
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Self::Const(Value::Int(v))
    }
}

impl From<i32> for Node {
    fn from(v: i32) -> Self {
        Self::Const(Value::Int(i64::from(v)))
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Self::Const(Value::Float(v))
    }
}

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Self::Const(Value::Bool(v))
    }
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Self::Const(Value::from(v))
    }
}

/// A program: a list of top-level statements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    /// Statements in order.
    pub items: Vec<Node>,
}

/// An encodable tree that may contain programs.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    /// Plain data.
    Value(Value),
    /// A sized array of items.
    Array(Vec<Item>),
    /// A program; decodes to its result.
    Program(Program),
}

impl From<Value> for Item {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl From<Program> for Item {
    fn from(p: Program) -> Self {
        Self::Program(p)
    }
}

/// Builds a program from statements.
pub fn program(items: impl IntoIterator<Item = Node>) -> Program {
    Program {
        items: items.into_iter().collect(),
    }
}

/// Builds an item array.
pub fn sia_array(items: impl IntoIterator<Item = Item>) -> Item {
    Item::Array(items.into_iter().collect())
}

/// Assigns `value` to slot `name`.
pub fn var(name: &str, value: impl Into<Node>) -> Node {
    Node::Var {
        name: name.to_string(),
        value: Some(Box::new(value.into())),
    }
}

/// Reads slot `name`.
pub fn slot(name: &str) -> Node {
    Node::Var {
        name: name.to_string(),
        value: None,
    }
}

/// Labels a top-level statement.
pub fn line(name: &str, body: impl Into<Node>) -> Node {
    Node::Line {
        name: name.to_string(),
        body: Some(Box::new(body.into())),
    }
}

/// Refers to a label, for [`jump`].
pub fn label(name: &str) -> Node {
    Node::Line {
        name: name.to_string(),
        body: None,
    }
}

/// `lhs > rhs`.
pub fn is_bigger(lhs: impl Into<Node>, rhs: impl Into<Node>) -> Node {
    Node::IsBigger(Box::new(lhs.into()), Box::new(rhs.into()))
}

/// `lhs * rhs`.
pub fn mul(lhs: impl Into<Node>, rhs: impl Into<Node>) -> Node {
    Node::Mul(Box::new(lhs.into()), Box::new(rhs.into()))
}

/// `sin(x)`.
pub fn sin(x: impl Into<Node>) -> Node {
    Node::Sin(Box::new(x.into()))
}

/// `dst += src`.
pub fn add_to(dst: impl Into<Node>, src: impl Into<Node>) -> Node {
    Node::AddTo(Box::new(dst.into()), Box::new(src.into()))
}

/// Conditional block.
pub fn if_(cond: impl Into<Node>, body: impl IntoIterator<Item = Node>) -> Node {
    Node::If {
        cond: Box::new(cond.into()),
        body: body.into_iter().collect(),
    }
}

/// Loop block.
pub fn while_(cond: impl Into<Node>, body: impl IntoIterator<Item = Node>) -> Node {
    Node::While {
        cond: Box::new(cond.into()),
        body: body.into_iter().collect(),
    }
}

/// Jumps to `target`, which must be a [`label`].
pub fn jump(target: Node) -> Node {
    Node::Jump(Box::new(target))
}

/// Stops the program.
pub fn exit() -> Node {
    Node::Exit
}

/// Appends `value` to the result array.
pub fn push(value: impl Into<Node>) -> Node {
    Node::Push(Box::new(value.into()))
}

/// A program compilation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileError {
    /// A slot was read before it was assigned.
    UnknownSlot {
        /// Slot name.
        name: String,
    },
    /// A jump refers to a label that has not been defined yet.
    UnknownLabel {
        /// Label name.
        name: String,
    },
    /// A label appears below the top level.
    LabelNotTopLevel {
        /// Label name.
        name: String,
    },
    /// A label is defined twice.
    DuplicateLabel {
        /// Label name.
        name: String,
    },
    /// A jump target is not a label reference.
    NotALabel,
    /// A label reference used outside a jump.
    BareLabel {
        /// Label name.
        name: String,
    },
    /// A statement used where a value is required.
    NoValue {
        /// The statement kind.
        node: &'static str,
    },
    /// More registers than a `u32` can address.
    TooManyRegisters,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSlot { name } => write!(f, "slot `{name}` is read before assignment"),
            Self::UnknownLabel { name } => write!(f, "label `{name}` is not defined"),
            Self::LabelNotTopLevel { name } => {
                write!(f, "label `{name}` must be a top-level statement")
            }
            Self::DuplicateLabel { name } => write!(f, "label `{name}` is defined twice"),
            Self::NotALabel => write!(f, "jump target is not a label"),
            Self::BareLabel { name } => write!(f, "label `{name}` used outside a jump"),
            Self::NoValue { node } => write!(f, "`{node}` has no value"),
            Self::TooManyRegisters => write!(f, "too many registers"),
        }
    }
}

impl core::error::Error for CompileError {}

/// Emits `program` and returns the block its result occupies.
pub(crate) fn compile(em: &mut Emitter<'_, '_>, program: &Program) -> Result<u64, EncodeError> {
    em.simple(Tag::ProgramStart)?;
    let mut c = Compiler::default();
    for node in &program.items {
        c.node(em, node)?;
    }
    em.simple(Tag::ProgramEnd)?;
    Ok(em.alloc_block())
}

#[derive(Debug, Default)]
struct Compiler {
    slots: HashMap<String, Reg>,
    labels: HashMap<String, u64>,
    next_reg: Reg,
    depth: usize,
    // Top-level instructions emitted so far; jump targets index into this list.
    top_count: u64,
}

impl Compiler {
    fn fresh(&mut self) -> Result<Reg, EncodeError> {
        let r = self.next_reg;
        self.next_reg = r.checked_add(1).ok_or(CompileError::TooManyRegisters)?;
        Ok(r)
    }

    fn instr(&mut self, em: &mut Emitter<'_, '_>, tag: Tag, ops: &[u64]) -> Result<(), EncodeError> {
        em.operands(tag, ops)?;
        self.count();
        Ok(())
    }

    fn count(&mut self) {
        if self.depth == 0 {
            self.top_count += 1;
        }
    }

    fn value(&mut self, em: &mut Emitter<'_, '_>, node: &Node) -> Result<Reg, EncodeError> {
        self.node(em, node)?
            .ok_or(EncodeError::Compile(CompileError::NoValue { node: node.name() }))
    }

    fn load(&mut self, em: &mut Emitter<'_, '_>, dst: Reg, v: &Value) -> Result<(), EncodeError> {
        let block = em.block_of(v, self.depth)?;
        self.instr(em, Tag::Slot, &[u64::from(dst), block])
    }

    fn binary(
        &mut self,
        em: &mut Emitter<'_, '_>,
        tag: Tag,
        lhs: &Node,
        rhs: &Node,
    ) -> Result<Reg, EncodeError> {
        let lhs = self.value(em, lhs)?;
        let rhs = self.value(em, rhs)?;
        let dst = self.fresh()?;
        self.instr(em, tag, &[u64::from(dst), u64::from(lhs), u64::from(rhs)])?;
        Ok(dst)
    }

    fn block(
        &mut self,
        em: &mut Emitter<'_, '_>,
        open: Tag,
        close: Tag,
        cond: &Node,
        body: &[Node],
    ) -> Result<(), EncodeError> {
        let max = em.max_depth();
        if self.depth >= max {
            return Err(EncodeError::TooDeep { max });
        }
        em.simple(open)?;
        self.depth += 1;
        let test = self.value(em, cond)?;
        em.operands(Tag::Test, &[u64::from(test)])?;
        for node in body {
            self.node(em, node)?;
        }
        em.simple(close)?;
        self.depth -= 1;
        self.count();
        Ok(())
    }

    fn assign(
        &mut self,
        em: &mut Emitter<'_, '_>,
        name: &str,
        value: &Node,
    ) -> Result<Reg, EncodeError> {
        let bound = self.slots.get(name).copied();
        let reg = match (value, bound) {
            (Node::Const(v), _) => {
                let dst = match bound {
                    Some(r) => r,
                    None => self.fresh()?,
                };
                self.load(em, dst, v)?;
                dst
            }
            (_, Some(dst)) => {
                let src = self.value(em, value)?;
                self.instr(em, Tag::Mov, &[u64::from(dst), u64::from(src)])?;
                dst
            }
            (_, None) => {
                let src = self.value(em, value)?;
                // A register owned by another slot is copied so later updates stay independent.
                if self.slots.values().any(|r| *r == src) {
                    let dst = self.fresh()?;
                    self.instr(em, Tag::Mov, &[u64::from(dst), u64::from(src)])?;
                    dst
                } else {
                    src
                }
            }
        };
        self.slots.insert(name.to_string(), reg);
        Ok(reg)
    }

    fn node(&mut self, em: &mut Emitter<'_, '_>, node: &Node) -> Result<Option<Reg>, EncodeError> {
        match node {
            Node::Const(v) => {
                let dst = self.fresh()?;
                self.load(em, dst, v)?;
                Ok(Some(dst))
            }
            Node::Var {
                name,
                value: Some(value),
            } => self.assign(em, name, value).map(Some),
            Node::Var { name, value: None } => match self.slots.get(name) {
                Some(r) => Ok(Some(*r)),
                None => Err(CompileError::UnknownSlot { name: name.clone() }.into()),
            },
            Node::Line {
                name,
                body: Some(body),
            } => {
                if self.depth != 0 {
                    return Err(CompileError::LabelNotTopLevel { name: name.clone() }.into());
                }
                if self.labels.contains_key(name) {
                    return Err(CompileError::DuplicateLabel { name: name.clone() }.into());
                }
                self.labels.insert(name.clone(), self.top_count);
                self.node(em, body)
            }
            Node::Line { name, body: None } => {
                Err(CompileError::BareLabel { name: name.clone() }.into())
            }
            Node::IsBigger(lhs, rhs) => self.binary(em, Tag::IsBigger, lhs, rhs).map(Some),
            Node::Mul(lhs, rhs) => self.binary(em, Tag::Mul, lhs, rhs).map(Some),
            Node::Sin(x) => {
                let src = self.value(em, x)?;
                let dst = self.fresh()?;
                self.instr(em, Tag::Sin, &[u64::from(dst), u64::from(src)])?;
                Ok(Some(dst))
            }
            Node::AddTo(dst, src) => {
                let dst = self.value(em, dst)?;
                let src = self.value(em, src)?;
                self.instr(em, Tag::AddTo, &[u64::from(dst), u64::from(src)])?;
                Ok(Some(dst))
            }
            Node::If { cond, body } => {
                self.block(em, Tag::If, Tag::EndIf, cond, body)?;
                Ok(None)
            }
            Node::While { cond, body } => {
                self.block(em, Tag::While, Tag::EndWhile, cond, body)?;
                Ok(None)
            }
            Node::Jump(target) => {
                let Node::Line { name, body: None } = target.as_ref() else {
                    return Err(CompileError::NotALabel.into());
                };
                let Some(ix) = self.labels.get(name).copied() else {
                    return Err(CompileError::UnknownLabel { name: name.clone() }.into());
                };
                self.instr(em, Tag::Jump, &[ix])?;
                Ok(None)
            }
            Node::Exit => {
                em.simple(Tag::Exit)?;
                self.count();
                Ok(None)
            }
            Node::Push(value) => {
                let src = self.value(em, value)?;
                self.instr(em, Tag::ArrayPush, &[u64::from(src)])?;
                Ok(None)
            }
        }
    }
}
