//! System call infrastructure for Tally
//!
//! This module implements the system call interface using INT 0x80 (Linux-style).
//! System calls are the primary interface between userspace and the kernel.
//!
//! Syscall numbers are small and dense (0..SYSCALL_COUNT) so per-process
//! accounting can index a fixed array with them and select them with a
//! 64-bit mask.

pub(crate) mod dispatcher;
pub mod errno;
pub mod handler;
pub mod handlers;
pub mod syscount;
pub mod userptr;

pub use dispatcher::dispatch;
pub use errno::ErrorCode;
pub use handler::SyscallFrame;

/// Number of syscalls in the table. Every `SyscallNumber` is below this.
pub const SYSCALL_COUNT: usize = 10;

/// System call numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u64)]
pub enum SyscallNumber {
    Exit = 0,
    Write = 1,
    Read = 2,
    Yield = 3,
    GetTime = 4,
    Fork = 5,
    Wait = 6,
    Exec = 7,
    GetPid = 8,
    GetSysCount = 9,
}

impl SyscallNumber {
    /// Every syscall, in number order.
    pub const ALL: &'static [SyscallNumber] = &[
        Self::Exit,
        Self::Write,
        Self::Read,
        Self::Yield,
        Self::GetTime,
        Self::Fork,
        Self::Wait,
        Self::Exec,
        Self::GetPid,
        Self::GetSysCount,
    ];

    /// Try to convert a u64 to a SyscallNumber
    pub fn from_u64(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::Exit),
            1 => Some(Self::Write),
            2 => Some(Self::Read),
            3 => Some(Self::Yield),
            4 => Some(Self::GetTime),
            5 => Some(Self::Fork),
            6 => Some(Self::Wait),
            7 => Some(Self::Exec),
            8 => Some(Self::GetPid),
            9 => Some(Self::GetSysCount),
            _ => None,
        }
    }

    /// Slot of this syscall in per-syscall tables.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Exit => "exit",
            Self::Write => "write",
            Self::Read => "read",
            Self::Yield => "yield",
            Self::GetTime => "get_time",
            Self::Fork => "fork",
            Self::Wait => "wait",
            Self::Exec => "exec",
            Self::GetPid => "getpid",
            Self::GetSysCount => "getsyscount",
        }
    }
}

// ALL must list every syscall exactly once, in order.
const _: () = {
    assert!(SyscallNumber::ALL.len() == SYSCALL_COUNT);
    let mut i = 0;
    while i < SYSCALL_COUNT {
        assert!(SyscallNumber::ALL[i] as usize == i);
        i += 1;
    }
};

/// System call result type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyscallResult {
    Ok(u64),
    /// Positive errno; the frame receives its negation.
    Err(u64),
}

impl SyscallResult {
    /// The value placed in RAX: the result, or `-errno` for failures.
    pub fn to_raw(self) -> u64 {
        match self {
            SyscallResult::Ok(val) => val,
            SyscallResult::Err(errno) => (-(errno as i64)) as u64,
        }
    }
}

impl From<ErrorCode> for SyscallResult {
    fn from(code: ErrorCode) -> Self {
        SyscallResult::Err(code as u64)
    }
}

impl<E: Into<ErrorCode>> From<Result<u64, E>> for SyscallResult {
    fn from(result: Result<u64, E>) -> Self {
        match result {
            Ok(val) => SyscallResult::Ok(val),
            Err(e) => SyscallResult::from(e.into()),
        }
    }
}

/// Initialize the system call infrastructure
pub fn init() {
    log::info!("Initializing system call infrastructure");

    // The INT 0x80 gate itself is installed by the boot code's IDT setup,
    // which points it at the entry stub that calls rust_syscall_handler().

    log::info!(
        "System call infrastructure initialized ({} syscalls)",
        SYSCALL_COUNT
    );
}
