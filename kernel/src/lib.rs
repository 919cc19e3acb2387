#![cfg_attr(not(test), no_std)]

//! Tally kernel core.
//!
//! Hardware independent part of the kernel: syscall dispatch, per-process
//! syscall counting, the process table, user memory, console and logging.
//! Boot code owns the IDT and calls [`syscall::handler::rust_syscall_handler`]
//! from the `int 0x80` entry stub.

extern crate alloc;

pub mod config;
pub mod console;
pub mod logger;
pub mod memory;
pub mod process;
pub mod state;
pub mod syscall;
pub mod tracing;

use config::KernelConfig;

/// Bring up the kernel core: logger, syscall layer, and global state.
///
/// Returns `Err` if a logger was already installed; the rest of the
/// kernel is initialised regardless.
pub fn init(config: KernelConfig) -> Result<(), log::SetLoggerError> {
    if let Some(sink) = config.log_sink {
        logger::set_sink(sink);
    }
    let logged = logger::init(config.log_level);
    syscall::init();
    state::init(config);
    logged
}
