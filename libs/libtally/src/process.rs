//! Process management syscall wrappers

use core::ffi::CStr;

use crate::errno::Errno;
use crate::error::Error;
use crate::syscall::{nr, raw};
use crate::types::Pid;

/// Most arguments the kernel accepts for a new image.
pub const MAX_ARGS: usize = 32;

/// Exit the current process with the given exit code.
///
/// This function never returns.
#[inline]
pub fn exit(code: i32) -> ! {
    unsafe {
        raw::syscall1(nr::EXIT, code as u64);
    }
    // Should never reach here, but need this for the ! return type
    loop {
        core::hint::spin_loop();
    }
}

/// Fill `table` with the NULL-terminated pointer array the kernel expects.
fn argv_table(argv: &[&CStr], table: &mut [u64; MAX_ARGS + 1]) -> Result<(), Error> {
    if argv.len() > MAX_ARGS {
        return Err(Error::Os(Errno::E2BIG));
    }
    for (slot, arg) in table.iter_mut().zip(argv) {
        *slot = arg.as_ptr() as u64;
    }
    table[argv.len()] = 0;
    Ok(())
}

/// Replace the current process image with `path`, started with `argv`.
///
/// Syscall counting state is kept across the replacement. Only returns on
/// failure, with the reason.
pub fn exec(path: &CStr, argv: &[&CStr]) -> Error {
    let mut table = [0u64; MAX_ARGS + 1];
    if let Err(e) = argv_table(argv, &mut table) {
        return e;
    }
    let ret = unsafe {
        raw::syscall2(nr::EXEC, path.as_ptr() as u64, table.as_ptr() as u64) as i64
    };
    match Error::from_syscall(ret) {
        Err(e) => e,
        // The kernel never resumes the old image after a successful exec
        Ok(_) => Error::Os(Errno::EINVAL),
    }
}

/// Yield the CPU to the scheduler.
#[inline]
pub fn yield_now() {
    unsafe {
        raw::syscall0(nr::YIELD);
    }
}

/// Reap one exited child without blocking.
///
/// `Errno::EAGAIN` means children exist but none has exited yet.
pub fn try_wait(status: Option<&mut i32>) -> Result<Pid, Error> {
    let status_ptr = match status {
        Some(s) => s as *mut i32 as u64,
        None => 0,
    };
    let ret = unsafe { raw::syscall1(nr::WAIT, status_ptr) as i64 };
    Error::from_syscall(ret).map(Pid::from_raw)
}

/// Wait for any child to exit, yielding while none has.
pub fn wait(status: &mut i32) -> Result<Pid, Error> {
    retry_on_again(|| try_wait(Some(&mut *status)), yield_now)
}

/// Repeat `attempt` while it fails with `EAGAIN`, calling `idle` in between.
fn retry_on_again<T>(
    mut attempt: impl FnMut() -> Result<T, Error>,
    mut idle: impl FnMut(),
) -> Result<T, Error> {
    loop {
        match attempt() {
            Err(Error::Os(Errno::EAGAIN)) => idle(),
            other => return other,
        }
    }
}
