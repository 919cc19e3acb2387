//! Tally Userspace System Call Library
//!
//! Safe wrappers around the Tally kernel syscalls, so userspace programs can
//! talk to the kernel without writing raw inline assembly.
//!
//! # Usage
//!
//! ```rust,ignore
//! use libtally::{io, process, syscount};
//!
//! // Count every write from here on, including after exec
//! syscount::get_sys_count(syscount::mask_of(&[syscount::Syscall::Write]))?;
//! io::stdout().write_str("counted\n")?;
//! process::exit(0);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

// Re-export all public APIs
pub use errno::Errno;
pub use error::Error;
pub use syscall::raw;
pub use types::*;

pub mod errno;
pub mod error;
pub mod io;
pub mod process;
pub mod syscall;
pub mod syscount;
pub mod types;
