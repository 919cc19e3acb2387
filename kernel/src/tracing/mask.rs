//! Syscall selection mask.
//!
//! A `SyscallMask` works like the enable bitmap of a trace provider: bit N
//! selects syscall number N. A value of 0 selects nothing, `u64::MAX` selects
//! every syscall. Bits at or above `SYSCALL_COUNT` are kept as given but can
//! never match, so callers may pass masks built for a larger syscall table.

use crate::syscall::{SyscallNumber, SYSCALL_COUNT};

/// Bitfield over syscall numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct SyscallMask(u64);

impl SyscallMask {
    /// Mask that selects nothing (counting disabled).
    pub const NONE: SyscallMask = SyscallMask(0);

    /// Mask that selects every syscall the kernel knows about.
    pub const ALL: SyscallMask = SyscallMask(Self::known_bits());

    pub const fn from_bits(bits: u64) -> Self {
        SyscallMask(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Bits that correspond to a real syscall number.
    pub const fn known_bits() -> u64 {
        if SYSCALL_COUNT >= 64 {
            u64::MAX
        } else {
            (1u64 << SYSCALL_COUNT) - 1
        }
    }

    /// True when no syscall is selected.
    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 & Self::known_bits() == 0
    }

    /// Check whether syscall `nr` is selected.
    ///
    /// O(1): one shift and one AND.
    #[inline(always)]
    pub const fn contains(self, nr: SyscallNumber) -> bool {
        let bit = nr as u64;
        bit < 64 && (self.0 >> bit) & 1 == 1
    }

    /// Return a copy of this mask with `nr` selected.
    pub const fn with(self, nr: SyscallNumber) -> Self {
        SyscallMask(self.0 | (1u64 << (nr as u64)))
    }

    /// Iterate over the selected syscalls in ascending number order.
    pub fn iter(self) -> impl Iterator<Item = SyscallNumber> {
        SyscallNumber::ALL
            .iter()
            .copied()
            .filter(move |nr| self.contains(*nr))
    }
}

impl From<u64> for SyscallMask {
    fn from(bits: u64) -> Self {
        SyscallMask(bits)
    }
}

impl core::fmt::Display for SyscallMask {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mask_selects_nothing() {
        let mask = SyscallMask::NONE;
        assert!(mask.is_empty());
        for nr in SyscallNumber::ALL {
            assert!(!mask.contains(*nr));
        }
    }

    #[test]
    fn bit_zero_selects_exit() {
        let mask = SyscallMask::from_bits(1);
        assert!(mask.contains(SyscallNumber::Exit));
        assert!(!mask.contains(SyscallNumber::Write));
    }

    #[test]
    fn unknown_bits_never_match() {
        let mask = SyscallMask::from_bits(1 << 40);
        assert!(mask.is_empty());
        assert_eq!(mask.iter().count(), 0);
        // The bits are preserved as given.
        assert_eq!(mask.bits(), 1 << 40);
    }

    #[test]
    fn all_covers_the_table() {
        assert_eq!(SyscallMask::ALL.iter().count(), SYSCALL_COUNT);
        assert_eq!(SyscallMask::from_bits(u64::MAX).iter().count(), SYSCALL_COUNT);
    }

    #[test]
    fn with_builds_masks() {
        let mask = SyscallMask::NONE
            .with(SyscallNumber::Write)
            .with(SyscallNumber::GetPid);
        assert_eq!(mask.bits(), (1 << 1) | (1 << 8));
        let selected: [SyscallNumber; 2] = [SyscallNumber::Write, SyscallNumber::GetPid];
        assert!(mask.iter().eq(selected.iter().copied()));
    }
}
