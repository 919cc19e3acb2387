//! Per-process syscall counting
//!
//! The kernel keeps one counter per syscall number for every process, plus a
//! mask selecting which syscalls are counted. Both survive `exec`, so a
//! launcher can set a mask and then replace itself with the program it wants
//! to measure. `fork` children start with an empty mask and zero counts.

use crate::error::Error;
use crate::syscall::{nr, raw};

/// Syscalls that can be selected in a counting mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum Syscall {
    Exit = nr::EXIT,
    Write = nr::WRITE,
    Read = nr::READ,
    Yield = nr::YIELD,
    GetTime = nr::GET_TIME,
    Fork = nr::FORK,
    Wait = nr::WAIT,
    Exec = nr::EXEC,
    GetPid = nr::GETPID,
    GetSysCount = nr::GETSYSCOUNT,
}

impl Syscall {
    /// Mask bit selecting this syscall.
    pub const fn bit(self) -> u64 {
        1 << (self as u64)
    }
}

/// Mask selecting every syscall in `calls`.
pub const fn mask_of(calls: &[Syscall]) -> u64 {
    let mut mask = 0;
    let mut i = 0;
    while i < calls.len() {
        mask |= calls[i].bit();
        i += 1;
    }
    mask
}

/// Mask selecting every syscall the kernel implements.
pub const ALL: u64 = (1 << nr::COUNT) - 1;

/// Install `mask` as this process's counting mask.
///
/// Returns the number of syscalls counted under the previous mask. Counts
/// are not reset; a zero mask stops counting.
#[inline]
pub fn get_sys_count(mask: u64) -> Result<u64, Error> {
    let ret = unsafe { raw::syscall1(nr::GETSYSCOUNT, mask) as i64 };
    Error::from_syscall(ret)
}
