//! Unified error type for libtally operations.
//!
//! All public functions in libtally return `Result<T, Error>` for consistent
//! error handling. Use the `?` operator freely across modules.

use crate::errno::Errno;

/// Unified error type for libtally operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A POSIX errno from a failed syscall.
    Os(Errno),
}

impl Error {
    /// Convert a raw syscall return value to `Result`.
    ///
    /// Syscalls return negative values on failure (negated errno).
    /// Non-negative values indicate success.
    #[inline]
    pub fn from_syscall(ret: i64) -> Result<u64, Error> {
        if ret < 0 {
            Err(Error::Os(Errno::from_raw(-ret)))
        } else {
            Ok(ret as u64)
        }
    }

    /// The errno behind this error.
    pub fn errno(&self) -> Errno {
        match self {
            Error::Os(e) => *e,
        }
    }
}

impl From<Errno> for Error {
    fn from(e: Errno) -> Self {
        Error::Os(e)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Os(e) => write!(f, "{:?} ({})", e, e.description()),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl From<Error> for std::io::Error {
    fn from(e: Error) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, e)
    }
}
