//! POSIX errno values
//!
//! Standard error codes returned by system calls. Handlers return the
//! positive code in `SyscallResult::Err`; userspace sees its negation.

/// Error codes used by the syscall layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum ErrorCode {
    /// No such file or directory
    NoEntry = 2,
    /// No such process
    NoProcess = 3,
    /// Argument list too long
    ArgumentListTooLong = 7,
    /// Bad file descriptor
    BadFd = 9,
    /// No child processes
    NoChild = 10,
    /// Resource temporarily unavailable (would block)
    Again = 11,
    /// Bad address
    Fault = 14,
    /// Invalid argument
    InvalidArgument = 22,
    /// File name too long
    NameTooLong = 36,
    /// Function not implemented
    NoSys = 38,
}

impl ErrorCode {
    /// Value userspace receives in RAX.
    pub const fn as_negative(self) -> i64 {
        -(self as i64)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::NoEntry => "ENOENT",
            Self::NoProcess => "ESRCH",
            Self::ArgumentListTooLong => "E2BIG",
            Self::BadFd => "EBADF",
            Self::NoChild => "ECHILD",
            Self::Again => "EAGAIN",
            Self::Fault => "EFAULT",
            Self::InvalidArgument => "EINVAL",
            Self::NameTooLong => "ENAMETOOLONG",
            Self::NoSys => "ENOSYS",
        }
    }
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({})", self.name(), *self as u64)
    }
}
