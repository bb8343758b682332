// Copyright 2026 the Sia Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `tracing` adapter for `sia` decode and program traces.
//!
//! [`TracingTraceSink`] implements [`TraceSink`] by emitting one `tracing` event per callback:
//! `trace!` for decoded tags and executed instructions, `debug!` for program run boundaries.
//! All events use the `sia` target.
//!
//! ```
//! use sia::Decoder;
//! use sia::trace::TraceMask;
//! use sia_tracing::TracingTraceSink;
//!
//! let mut sink = TracingTraceSink::new(TraceMask::ALL);
//! let mut dec = Decoder::default();
//! let v = dec.deserialize_with_trace(&[0x1F, 0xFF], sink.mask(), Some(&mut sink))?;
//! assert_eq!(v, sia::Value::Bool(true));
//! assert_eq!(sink.blocks_seen(), 2);
//! # Ok::<(), sia::decoder::DecodeError>(())
//! ```

use sia::tag::Tag;
use sia::trace::{TraceMask, TraceOutcome, TraceSink};
use tracing::{debug, trace};

/// Forwards trace callbacks to `tracing`.
#[derive(Clone, Debug)]
pub struct TracingTraceSink {
    mask: TraceMask,
    blocks: u64,
    instrs: u64,
    runs: u64,
}

impl Default for TracingTraceSink {
    fn default() -> Self {
        Self::new(TraceMask::ALL)
    }
}

impl TracingTraceSink {
    /// Creates a sink that asks for the events in `mask`.
    #[must_use]
    pub fn new(mask: TraceMask) -> Self {
        Self {
            mask,
            blocks: 0,
            instrs: 0,
            runs: 0,
        }
    }

    /// Returns the requested event mask.
    #[must_use]
    pub fn mask(&self) -> TraceMask {
        self.mask
    }

    /// Number of decoded tags reported so far.
    #[must_use]
    pub fn blocks_seen(&self) -> u64 {
        self.blocks
    }

    /// Number of executed instructions reported so far.
    #[must_use]
    pub fn instrs_seen(&self) -> u64 {
        self.instrs
    }

    /// Number of program runs started so far.
    #[must_use]
    pub fn runs_seen(&self) -> u64 {
        self.runs
    }
}

impl TraceSink for TracingTraceSink {
    fn mask(&self) -> TraceMask {
        self.mask
    }

    fn block(&mut self, offset: usize, tag: Tag, block: Option<u64>) {
        self.blocks += 1;
        match block {
            Some(block) => trace!(target: "sia", offset, tag = tag.mnemonic(), block, "tag"),
            None => trace!(target: "sia", offset, tag = tag.mnemonic(), "tag"),
        }
    }

    fn run_start(&mut self, instr_count: usize, register_count: u32) {
        self.runs += 1;
        debug!(target: "sia", instr_count, register_count, "program start");
    }

    fn instr(&mut self, depth: usize, ip: usize, tag: Tag) {
        self.instrs += 1;
        trace!(target: "sia", depth, ip, op = tag.mnemonic(), "instr");
    }

    fn run_end(&mut self, outcome: TraceOutcome<'_>) {
        match outcome {
            TraceOutcome::Ok => debug!(target: "sia", "program end"),
            TraceOutcome::Trap(info) => debug!(target: "sia", trap = %info, "program trapped"),
        }
    }
}
