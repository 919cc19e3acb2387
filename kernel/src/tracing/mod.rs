//! Per-process syscall accounting.
//!
//! Every process control block embeds one [`SyscallAccounting`]: the active
//! [`SyscallMask`] and a [`CounterTable`]. The dispatcher calls
//! [`SyscallAccounting::record`] for each decoded syscall before running its
//! handler, and the `GetSysCount` syscall swaps the mask through
//! [`SyscallAccounting::install_mask`].
//!
//! # Lifecycle
//!
//! ```text
//!   create/fork ──> mask = 0, counts = 0
//!        │
//!        ├── GetSysCount(m) ──> mask = m, counts kept, returns total(old mask)
//!        ├── any syscall nr ──> counts[nr] += 1 if mask has bit nr
//!        ├── exec           ──> nothing changes
//!        └── reap           ──> state dropped with the process
//! ```
//!
//! Only the owning process issues syscalls against its own accounting state,
//! and a process cannot run two syscalls at once, so no locking happens here
//! beyond the kernel lock that already guards the process table.

pub mod counter;
pub mod mask;

pub use counter::CounterTable;
pub use mask::SyscallMask;

use crate::syscall::SyscallNumber;

/// Counting state embedded in a process control block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyscallAccounting {
    mask: SyscallMask,
    counters: CounterTable,
}

impl SyscallAccounting {
    /// Fresh state: counting disabled, all counters at 0.
    pub const fn new() -> Self {
        Self {
            mask: SyscallMask::NONE,
            counters: CounterTable::new(),
        }
    }

    /// Dispatch hook. Bumps the counter for `nr` if the active mask selects it.
    ///
    /// Runs on every syscall. Never allocates, blocks, or fails.
    #[inline(always)]
    pub fn record(&mut self, nr: SyscallNumber) {
        if self.mask.contains(nr) {
            self.counters.increment(nr);
        }
    }

    /// Install `mask` and return the total accumulated under the previous one.
    ///
    /// Counters are left as they are; only the set of counters that will be
    /// bumped from now on changes.
    pub fn install_mask(&mut self, mask: SyscallMask) -> u64 {
        let previous = core::mem::replace(&mut self.mask, mask);
        self.counters.total(previous)
    }

    pub fn mask(&self) -> SyscallMask {
        self.mask
    }

    pub fn counters(&self) -> &CounterTable {
        &self.counters
    }

    /// Total under the active mask, without changing anything.
    pub fn current_total(&self) -> u64 {
        self.counters.total(self.mask)
    }
}
