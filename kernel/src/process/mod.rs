//! Process management for Tally
//!
//! This module handles process creation, scheduling, and lifecycle management.
//! A process is a running instance of a program with its own address space.
//!
//! The process table itself lives in [`crate::state::KernelState`]; use
//! [`crate::state::with_kernel`] to reach it.

pub mod creation;
pub mod exec;
pub mod fork;
pub mod manager;
pub mod process;

pub use manager::ProcessManager;
pub use process::{Process, ProcessId, ProcessState, UserContext};

use crate::syscall::ErrorCode;

/// Failures of process table operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessError {
    /// No process with that pid
    NotFound,
    /// Program name not in the program table
    NoSuchProgram,
    /// Process table is full
    TooManyProcesses,
    /// Argument vector does not fit the limits or the new stack
    ArgumentsTooLarge,
    /// A path or argument string is too long
    NameTooLong,
    /// A user pointer was invalid
    BadAddress,
    /// Caller has no children to wait for
    NoChildren,
    /// Children exist but none has exited yet
    WouldBlock,
}

impl From<ProcessError> for ErrorCode {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::NotFound => ErrorCode::NoProcess,
            ProcessError::NoSuchProgram => ErrorCode::NoEntry,
            ProcessError::TooManyProcesses => ErrorCode::Again,
            ProcessError::ArgumentsTooLarge => ErrorCode::ArgumentListTooLong,
            ProcessError::NameTooLong => ErrorCode::NameTooLong,
            ProcessError::BadAddress => ErrorCode::Fault,
            ProcessError::NoChildren => ErrorCode::NoChild,
            ProcessError::WouldBlock => ErrorCode::Again,
        }
    }
}

impl From<ErrorCode> for ProcessError {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::ArgumentListTooLong => ProcessError::ArgumentsTooLarge,
            ErrorCode::NameTooLong => ProcessError::NameTooLong,
            _ => ProcessError::BadAddress,
        }
    }
}

impl core::fmt::Display for ProcessError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            ProcessError::NotFound => "process not found",
            ProcessError::NoSuchProgram => "no such program",
            ProcessError::TooManyProcesses => "process table full",
            ProcessError::ArgumentsTooLarge => "argument list too long",
            ProcessError::NameTooLong => "name too long",
            ProcessError::BadAddress => "bad address",
            ProcessError::NoChildren => "no children",
            ProcessError::WouldBlock => "no child has exited",
        };
        f.write_str(msg)
    }
}
