//! Per-process syscall counter table.
//!
//! One slot per syscall number, sized at build time from `SYSCALL_COUNT`, so
//! the dispatch path never allocates. The table is owned by exactly one
//! process control block and only that process's own syscalls touch it, so
//! plain integers are enough; no atomics or locks.
//!
//! Increments saturate at `u64::MAX`. The total for a live process therefore
//! never decreases.

use crate::syscall::{SyscallNumber, SYSCALL_COUNT};
use crate::tracing::mask::SyscallMask;

/// Invocation counts indexed by syscall number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterTable {
    counts: [u64; SYSCALL_COUNT],
}

impl CounterTable {
    /// A table with every counter at 0.
    pub const fn new() -> Self {
        Self {
            counts: [0; SYSCALL_COUNT],
        }
    }

    /// Add one to the counter for `nr`.
    #[inline(always)]
    pub fn increment(&mut self, nr: SyscallNumber) {
        let slot = &mut self.counts[nr.index()];
        *slot = slot.saturating_add(1);
    }

    /// Counter value for a single syscall.
    #[inline]
    pub fn get(&self, nr: SyscallNumber) -> u64 {
        self.counts[nr.index()]
    }

    /// Sum of the counters selected by `mask`.
    ///
    /// Bits outside the syscall table contribute nothing.
    pub fn total(&self, mask: SyscallMask) -> u64 {
        mask.iter()
            .fold(0u64, |acc, nr| acc.saturating_add(self.get(nr)))
    }

    /// Sum of every counter in the table.
    pub fn grand_total(&self) -> u64 {
        self.counts
            .iter()
            .fold(0u64, |acc, &count| acc.saturating_add(count))
    }
}

impl Default for CounterTable {
    fn default() -> Self {
        Self::new()
    }
}
