//! Common types used across libtally

/// A file descriptor. This is a lightweight copyable handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Fd(u64);

impl Fd {
    pub const STDIN: Fd = Fd(0);
    pub const STDOUT: Fd = Fd(1);
    pub const STDERR: Fd = Fd(2);

    pub const fn from_raw(raw: u64) -> Self {
        Fd(raw)
    }
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Process ID type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Pid(u64);

impl Pid {
    pub const fn from_raw(raw: u64) -> Self {
        Pid(raw)
    }
    pub const fn raw(self) -> u64 {
        self.0
    }
}
