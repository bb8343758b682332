// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decode-time interpreter for embedded programs.
//!
//! A program is a list of [`Instr`]. `If` and `While` carry nested lists; `Jump` targets an index
//! in the top-level list. The VM owns a register file separate from the decoder's block table,
//! so blocks stay immutable while registers are overwritten freely.

use core::fmt;

use crate::tag::Tag;
use crate::trace::{TraceMask, TraceOutcome, TraceSink};
use crate::value::{Value, ValueKind};

/// Register index.
pub type Reg = u32;

/// A decoded program instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum Instr {
    /// `dst = blocks[block]`.
    Slot {
        /// Destination register.
        dst: Reg,
        /// Source block index.
        block: u64,
    },
    /// `dst = src`.
    Mov {
        /// Destination register.
        dst: Reg,
        /// Source register.
        src: Reg,
    },
    /// `dst = lhs > rhs`.
    IsBigger {
        /// Destination register.
        dst: Reg,
        /// Left operand.
        lhs: Reg,
        /// Right operand.
        rhs: Reg,
    },
    /// `dst = dst + src`.
    AddTo {
        /// Register updated in place.
        dst: Reg,
        /// Addend.
        src: Reg,
    },
    /// `dst = lhs * rhs`.
    Mul {
        /// Destination register.
        dst: Reg,
        /// Left operand.
        lhs: Reg,
        /// Right operand.
        rhs: Reg,
    },
    /// `dst = sin(src)`.
    Sin {
        /// Destination register.
        dst: Reg,
        /// Source register.
        src: Reg,
    },
    /// Appends `src` to the program's output array.
    Push {
        /// Source register.
        src: Reg,
    },
    /// Continues at top-level instruction `target`.
    Jump {
        /// Top-level instruction index.
        target: u32,
    },
    /// Stops the program.
    Exit,
    /// Runs `cond`, then `body` once if register `test` holds `true`.
    If {
        /// Condition instructions.
        cond: Vec<Instr>,
        /// Boolean register tested after `cond`.
        test: Reg,
        /// Body instructions.
        body: Vec<Instr>,
    },
    /// Runs `cond`, then `body`, for as long as register `test` holds `true` after `cond`.
    While {
        /// Condition instructions.
        cond: Vec<Instr>,
        /// Boolean register tested after `cond`.
        test: Reg,
        /// Body instructions.
        body: Vec<Instr>,
    },
}

impl Instr {
    /// Returns the tag this instruction was decoded from.
    #[must_use]
    pub fn tag(&self) -> Tag {
        match self {
            Self::Slot { .. } => Tag::Slot,
            Self::Mov { .. } => Tag::Mov,
            Self::IsBigger { .. } => Tag::IsBigger,
            Self::AddTo { .. } => Tag::AddTo,
            Self::Mul { .. } => Tag::Mul,
            Self::Sin { .. } => Tag::Sin,
            Self::Push { .. } => Tag::ArrayPush,
            Self::Jump { .. } => Tag::Jump,
            Self::Exit => Tag::Exit,
            Self::If { .. } => Tag::If,
            Self::While { .. } => Tag::While,
        }
    }
}

/// A program ready to run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledProgram {
    /// Top-level instructions.
    pub instrs: Vec<Instr>,
    /// Size of the register file.
    pub register_count: u32,
    /// Whether the program pushes to an output array.
    pub has_push: bool,
}

/// Resource limits for program runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Limits {
    /// Instruction budget per run; `If`/`While` and each loop pass cost 1.
    pub fuel: u64,
    /// Maximum register file size.
    pub max_registers: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            fuel: u64::MAX,
            max_registers: 1 << 16,
        }
    }
}

/// A runtime trap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trap {
    /// Fuel limit exceeded.
    FuelExceeded,
    /// A register was out of bounds.
    RegOutOfBounds {
        /// Register index.
        reg: Reg,
    },
    /// A block index was out of bounds.
    BlockOutOfBounds {
        /// Block index.
        block: u64,
    },
    /// A jump target was past the end of the top-level list.
    JumpOutOfBounds {
        /// Target index.
        target: u32,
    },
    /// An operand had the wrong kind.
    TypeMismatch {
        /// Instruction tag.
        instr: Tag,
        /// Expected kind.
        expected: &'static str,
        /// Actual kind.
        actual: ValueKind,
    },
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FuelExceeded => write!(f, "fuel exceeded"),
            Self::RegOutOfBounds { reg } => write!(f, "register r{reg} out of bounds"),
            Self::BlockOutOfBounds { block } => write!(f, "block {block} out of bounds"),
            Self::JumpOutOfBounds { target } => write!(f, "jump target {target} out of bounds"),
            Self::TypeMismatch {
                instr,
                expected,
                actual,
            } => write!(
                f,
                "{} expected {expected}, got {actual}",
                instr.mnemonic()
            ),
        }
    }
}

impl core::error::Error for Trap {}

/// A trap annotated with its location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrapInfo {
    /// Nesting depth (0 for the top-level list).
    pub depth: usize,
    /// Instruction index within its list.
    pub ip: usize,
    /// Trap kind.
    pub trap: Trap,
}

impl fmt::Display for TrapInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trap at depth {} ip={}: {}", self.depth, self.ip, self.trap)
    }
}

impl core::error::Error for TrapInfo {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.trap)
    }
}

enum Flow {
    Next,
    Jump(u32),
    Exit,
}

struct Machine<'b, 't, 's> {
    blocks: &'b [Value],
    regs: Vec<Value>,
    output: Vec<Value>,
    last: Option<Value>,
    fuel: u64,
    top_len: usize,
    trace_mask: TraceMask,
    trace: &'t mut Option<&'s mut dyn TraceSink>,
}

/// Runs `program` against the decoder's block table.
///
/// The result is the output array if the program contains a push, otherwise the value last
/// written to a register (`Undefined` if none).
pub fn run(
    program: &CompiledProgram,
    blocks: &[Value],
    limits: &Limits,
    trace_mask: TraceMask,
    trace: &mut Option<&mut dyn TraceSink>,
) -> Result<Value, TrapInfo> {
    if trace_mask.contains(TraceMask::RUN)
        && let Some(t) = trace.as_mut()
    {
        t.run_start(program.instrs.len(), program.register_count);
    }

    let mut m = Machine {
        blocks,
        regs: vec![Value::Undefined; program.register_count as usize],
        output: Vec::new(),
        last: None,
        fuel: limits.fuel,
        top_len: program.instrs.len(),
        trace_mask,
        trace,
    };
    let result = m.run_top(&program.instrs).map(|()| {
        if program.has_push {
            Value::Array(core::mem::take(&mut m.output))
        } else {
            m.last.take().unwrap_or(Value::Undefined)
        }
    });

    if trace_mask.contains(TraceMask::RUN)
        && let Some(t) = m.trace.as_mut()
    {
        let outcome = match &result {
            Ok(_) => TraceOutcome::Ok,
            Err(e) => TraceOutcome::Trap(e),
        };
        t.run_end(outcome);
    }
    result
}

impl Machine<'_, '_, '_> {
    fn run_top(&mut self, instrs: &[Instr]) -> Result<(), TrapInfo> {
        let mut ip = 0;
        while let Some(instr) = instrs.get(ip) {
            match self.exec(instr, 0, ip)? {
                Flow::Next => ip += 1,
                Flow::Jump(target) => {
                    if target as usize > self.top_len {
                        return Err(TrapInfo {
                            depth: 0,
                            ip,
                            trap: Trap::JumpOutOfBounds { target },
                        });
                    }
                    ip = target as usize;
                }
                Flow::Exit => break,
            }
        }
        Ok(())
    }

    fn run_list(&mut self, instrs: &[Instr], depth: usize) -> Result<Flow, TrapInfo> {
        for (ip, instr) in instrs.iter().enumerate() {
            match self.exec(instr, depth, ip)? {
                Flow::Next => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Next)
    }

    fn exec(&mut self, instr: &Instr, depth: usize, ip: usize) -> Result<Flow, TrapInfo> {
        let trap = |trap| TrapInfo { depth, ip, trap };
        self.burn().map_err(trap)?;

        if self.trace_mask.contains(TraceMask::INSTR)
            && let Some(t) = self.trace.as_mut()
        {
            t.instr(depth, ip, instr.tag());
        }

        match instr {
            Instr::Slot { dst, block } => {
                let v = usize::try_from(*block)
                    .ok()
                    .and_then(|b| self.blocks.get(b))
                    .cloned()
                    .ok_or(Trap::BlockOutOfBounds { block: *block })
                    .map_err(trap)?;
                self.write(*dst, v).map_err(trap)?;
            }
            Instr::Mov { dst, src } => {
                let v = self.read(*src).map_err(trap)?.clone();
                self.write(*dst, v).map_err(trap)?;
            }
            Instr::IsBigger { dst, lhs, rhs } => {
                let a = self.num(*lhs, Tag::IsBigger).map_err(trap)?;
                let b = self.num(*rhs, Tag::IsBigger).map_err(trap)?;
                self.write(*dst, Value::Bool(a > b)).map_err(trap)?;
            }
            Instr::AddTo { dst, src } => {
                let a = self.num(*dst, Tag::AddTo).map_err(trap)?;
                let b = self.num(*src, Tag::AddTo).map_err(trap)?;
                self.write(*dst, Value::Float(a + b)).map_err(trap)?;
            }
            Instr::Mul { dst, lhs, rhs } => {
                let a = self.num(*lhs, Tag::Mul).map_err(trap)?;
                let b = self.num(*rhs, Tag::Mul).map_err(trap)?;
                self.write(*dst, Value::Float(a * b)).map_err(trap)?;
            }
            Instr::Sin { dst, src } => {
                let a = self.num(*src, Tag::Sin).map_err(trap)?;
                self.write(*dst, Value::Float(a.sin())).map_err(trap)?;
            }
            Instr::Push { src } => {
                let v = self.read(*src).map_err(trap)?.clone();
                self.output.push(v);
            }
            Instr::Jump { target } => return Ok(Flow::Jump(*target)),
            Instr::Exit => return Ok(Flow::Exit),
            Instr::If { cond, test, body } => {
                let flow = self.run_list(cond, depth + 1)?;
                if !matches!(flow, Flow::Next) {
                    return Ok(flow);
                }
                if self.truthy(*test, Tag::If).map_err(trap)? {
                    return self.run_list(body, depth + 1);
                }
            }
            Instr::While { cond, test, body } => loop {
                let flow = self.run_list(cond, depth + 1)?;
                if !matches!(flow, Flow::Next) {
                    return Ok(flow);
                }
                if !self.truthy(*test, Tag::While).map_err(trap)? {
                    break;
                }
                let flow = self.run_list(body, depth + 1)?;
                if !matches!(flow, Flow::Next) {
                    return Ok(flow);
                }
                self.burn().map_err(trap)?;
            },
        }
        Ok(Flow::Next)
    }

    fn burn(&mut self) -> Result<(), Trap> {
        if self.fuel == 0 {
            return Err(Trap::FuelExceeded);
        }
        self.fuel -= 1;
        Ok(())
    }

    fn read(&self, reg: Reg) -> Result<&Value, Trap> {
        self.regs
            .get(reg as usize)
            .ok_or(Trap::RegOutOfBounds { reg })
    }

    fn write(&mut self, reg: Reg, v: Value) -> Result<(), Trap> {
        let slot = self
            .regs
            .get_mut(reg as usize)
            .ok_or(Trap::RegOutOfBounds { reg })?;
        *slot = v.clone();
        self.last = Some(v);
        Ok(())
    }

    fn num(&self, reg: Reg, instr: Tag) -> Result<f64, Trap> {
        let v = self.read(reg)?;
        v.as_f64().ok_or(Trap::TypeMismatch {
            instr,
            expected: "number",
            actual: v.kind(),
        })
    }

    fn truthy(&self, reg: Reg, instr: Tag) -> Result<bool, Trap> {
        match self.read(reg)? {
            Value::Bool(b) => Ok(*b),
            other => Err(Trap::TypeMismatch {
                instr,
                expected: "bool",
                actual: other.kind(),
            }),
        }
    }
}
