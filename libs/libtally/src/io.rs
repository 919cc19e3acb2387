//! I/O syscall wrappers

use crate::error::Error;
use crate::syscall::{nr, raw};
use crate::types::Fd;

/// Write bytes to a file descriptor.
///
/// Returns the number of bytes written. Only stdout and stderr accept writes.
#[inline]
pub fn write(fd: Fd, buf: &[u8]) -> Result<usize, Error> {
    let ret = unsafe {
        raw::syscall3(nr::WRITE, fd.raw(), buf.as_ptr() as u64, buf.len() as u64) as i64
    };
    Error::from_syscall(ret).map(|n| n as usize)
}

/// Standard output writer
pub struct Stdout;

impl Stdout {
    /// Write bytes to stdout
    #[inline]
    pub fn write(&self, buf: &[u8]) -> Result<usize, Error> {
        write(Fd::STDOUT, buf)
    }

    /// Write a string to stdout
    #[inline]
    pub fn write_str(&self, s: &str) -> Result<usize, Error> {
        self.write(s.as_bytes())
    }
}

/// Standard error writer
pub struct Stderr;

impl Stderr {
    /// Write bytes to stderr
    #[inline]
    pub fn write(&self, buf: &[u8]) -> Result<usize, Error> {
        write(Fd::STDERR, buf)
    }

    /// Write a string to stderr
    #[inline]
    pub fn write_str(&self, s: &str) -> Result<usize, Error> {
        self.write(s.as_bytes())
    }
}

#[cfg(feature = "std")]
impl std::io::Write for Stdout {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Stdout::write(self, buf).map_err(Into::into)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(feature = "std")]
impl std::io::Write for Stderr {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Stderr::write(self, buf).map_err(Into::into)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Get a handle to stdout
#[inline]
pub fn stdout() -> Stdout {
    Stdout
}

/// Get a handle to stderr
#[inline]
pub fn stderr() -> Stderr {
    Stderr
}
