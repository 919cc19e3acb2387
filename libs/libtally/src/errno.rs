//! POSIX errno values
//!
//! These match Linux errno values for compatibility.

/// Error numbers returned by syscalls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum Errno {
    /// Operation not permitted
    EPERM = 1,
    /// No such file or directory
    ENOENT = 2,
    /// No such process
    ESRCH = 3,
    /// I/O error
    EIO = 5,
    /// Argument list too long
    E2BIG = 7,
    /// Bad file descriptor
    EBADF = 9,
    /// No child processes
    ECHILD = 10,
    /// Resource temporarily unavailable
    EAGAIN = 11,
    /// Out of memory
    ENOMEM = 12,
    /// Bad address
    EFAULT = 14,
    /// Invalid argument
    EINVAL = 22,
    /// File name too long
    ENAMETOOLONG = 36,
    /// Function not implemented
    ENOSYS = 38,
}

impl Errno {
    /// Convert a raw syscall return value to Result
    ///
    /// Syscalls return negative errno on error, non-negative on success.
    pub fn from_syscall(ret: i64) -> Result<u64, Errno> {
        if ret >= 0 {
            Ok(ret as u64)
        } else {
            Err(Errno::from_raw(-ret))
        }
    }

    /// Convert raw errno value to Errno enum
    pub fn from_raw(val: i64) -> Errno {
        match val {
            1 => Errno::EPERM,
            2 => Errno::ENOENT,
            3 => Errno::ESRCH,
            5 => Errno::EIO,
            7 => Errno::E2BIG,
            9 => Errno::EBADF,
            10 => Errno::ECHILD,
            11 => Errno::EAGAIN,
            12 => Errno::ENOMEM,
            14 => Errno::EFAULT,
            22 => Errno::EINVAL,
            36 => Errno::ENAMETOOLONG,
            38 => Errno::ENOSYS,
            _ => Errno::EINVAL, // Unknown error
        }
    }

    /// Short description, as `strerror` would give it.
    pub fn description(self) -> &'static str {
        match self {
            Errno::EPERM => "operation not permitted",
            Errno::ENOENT => "no such file or directory",
            Errno::ESRCH => "no such process",
            Errno::EIO => "I/O error",
            Errno::E2BIG => "argument list too long",
            Errno::EBADF => "bad file descriptor",
            Errno::ECHILD => "no child processes",
            Errno::EAGAIN => "resource temporarily unavailable",
            Errno::ENOMEM => "out of memory",
            Errno::EFAULT => "bad address",
            Errno::EINVAL => "invalid argument",
            Errno::ENAMETOOLONG => "file name too long",
            Errno::ENOSYS => "function not implemented",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_returns_map_to_errno() {
        assert_eq!(Errno::from_syscall(5), Ok(5));
        assert_eq!(Errno::from_syscall(0), Ok(0));
        assert_eq!(Errno::from_syscall(-2), Err(Errno::ENOENT));
        assert_eq!(Errno::from_syscall(-3), Err(Errno::ESRCH));
        assert_eq!(Errno::from_syscall(-9999), Err(Errno::EINVAL));
    }
}
