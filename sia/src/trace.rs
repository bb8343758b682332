// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing hooks for decoding and program runs.
//!
//! The decoder and VM only emit events requested by a [`TraceMask`]. To enable tracing, pass a
//! mask and a [`TraceSink`] to [`Decoder::deserialize_with_trace`] or
//! [`Decoder::deserialize_blocks_with_trace`].

#[cfg(doc)]
use crate::decoder::Decoder;

use crate::tag::Tag;
use crate::vm::TrapInfo;

/// A set of trace events.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TraceMask(u32);

impl core::ops::BitOr for TraceMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for TraceMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl TraceMask {
    /// No tracing.
    pub const NONE: Self = Self(0);
    /// Trace program run boundaries.
    ///
    /// Enables [`TraceSink::run_start`] and [`TraceSink::run_end`].
    pub const RUN: Self = Self(1 << 0);
    /// Trace each executed program instruction.
    ///
    /// Enables [`TraceSink::instr`].
    pub const INSTR: Self = Self(1 << 1);
    /// Trace each decoded tag.
    ///
    /// Enables [`TraceSink::block`].
    pub const BLOCK: Self = Self(1 << 2);
    /// Every event.
    pub const ALL: Self = Self(Self::RUN.0 | Self::INSTR.0 | Self::BLOCK.0);

    /// Returns `true` if this mask includes all bits in `other`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

/// Run outcome for tracing.
#[derive(Clone, Debug)]
pub enum TraceOutcome<'a> {
    /// Successful run.
    Ok,
    /// Trapped.
    Trap(&'a TrapInfo),
}

/// A sink for decode and VM events.
pub trait TraceSink {
    /// Returns the set of events the sink wants.
    fn mask(&self) -> TraceMask {
        TraceMask::NONE
    }

    /// Called after each tag is applied.
    ///
    /// - `offset`: byte offset of the tag within the current input
    /// - `tag`: the tag
    /// - `block`: the block index it produced, if any
    fn block(&mut self, _offset: usize, _tag: Tag, _block: Option<u64>) {}

    /// Called when a program starts running.
    fn run_start(&mut self, _instr_count: usize, _register_count: u32) {}

    /// Called for each executed instruction.
    ///
    /// `depth` is the nesting level (0 for top level) and `ip` the index within that list.
    fn instr(&mut self, _depth: usize, _ip: usize, _tag: Tag) {}

    /// Called when a program finishes or traps.
    fn run_end(&mut self, _outcome: TraceOutcome<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_ops() {
        let mut m = TraceMask::RUN;
        assert!(!m.contains(TraceMask::INSTR));
        m |= TraceMask::INSTR;
        assert!(m.contains(TraceMask::RUN | TraceMask::INSTR));
        assert!(TraceMask::ALL.contains(TraceMask::BLOCK));
        assert!(TraceMask::NONE.contains(TraceMask::NONE));
    }
}
