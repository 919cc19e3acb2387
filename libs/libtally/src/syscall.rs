//! Raw syscall primitives for Tally
//!
//! This module provides the low-level syscall interface using INT 0x80.
//! All syscalls follow the Linux AMD64 calling convention:
//! - Syscall number in RAX
//! - Arguments in RDI, RSI, RDX
//! - Return value in RAX (negative errno on failure)

/// Syscall numbers matching kernel/src/syscall/mod.rs
pub mod nr {
    pub const EXIT: u64 = 0;
    pub const WRITE: u64 = 1;
    pub const READ: u64 = 2;
    pub const YIELD: u64 = 3;
    pub const GET_TIME: u64 = 4;
    pub const FORK: u64 = 5;
    pub const WAIT: u64 = 6;
    pub const EXEC: u64 = 7;
    pub const GETPID: u64 = 8;
    pub const GETSYSCOUNT: u64 = 9;

    /// Number of syscalls the kernel implements.
    pub const COUNT: u64 = 10;
}

/// Raw syscall functions - use higher-level wrappers when possible
#[cfg(target_arch = "x86_64")]
pub mod raw {
    use core::arch::asm;

    #[inline(always)]
    pub unsafe fn syscall0(num: u64) -> u64 {
        let ret: u64;
        asm!(
            "int 0x80",
            in("rax") num,
            lateout("rax") ret,
            options(nostack, preserves_flags),
        );
        ret
    }

    #[inline(always)]
    pub unsafe fn syscall1(num: u64, arg1: u64) -> u64 {
        let ret: u64;
        asm!(
            "int 0x80",
            in("rax") num,
            in("rdi") arg1,
            lateout("rax") ret,
            options(nostack, preserves_flags),
        );
        ret
    }

    #[inline(always)]
    pub unsafe fn syscall2(num: u64, arg1: u64, arg2: u64) -> u64 {
        let ret: u64;
        asm!(
            "int 0x80",
            in("rax") num,
            in("rdi") arg1,
            in("rsi") arg2,
            lateout("rax") ret,
            options(nostack, preserves_flags),
        );
        ret
    }

    #[inline(always)]
    pub unsafe fn syscall3(num: u64, arg1: u64, arg2: u64, arg3: u64) -> u64 {
        let ret: u64;
        asm!(
            "int 0x80",
            in("rax") num,
            in("rdi") arg1,
            in("rsi") arg2,
            in("rdx") arg3,
            lateout("rax") ret,
            options(nostack, preserves_flags),
        );
        ret
    }
}

/// Tally only runs on x86_64; elsewhere every syscall fails with ENOSYS so
/// the library still builds for host-side tooling.
#[cfg(not(target_arch = "x86_64"))]
pub mod raw {
    const ENOSYS: u64 = (-38i64) as u64;

    pub unsafe fn syscall0(_num: u64) -> u64 {
        ENOSYS
    }

    pub unsafe fn syscall1(_num: u64, _arg1: u64) -> u64 {
        ENOSYS
    }

    pub unsafe fn syscall2(_num: u64, _arg1: u64, _arg2: u64) -> u64 {
        ENOSYS
    }

    pub unsafe fn syscall3(_num: u64, _arg1: u64, _arg2: u64, _arg3: u64) -> u64 {
        ENOSYS
    }
}
