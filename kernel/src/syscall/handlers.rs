//! System call handler implementations
//!
//! This module contains the actual implementation of each system call.
//! Handlers run with the kernel lock held and must not block.

use alloc::vec;

use super::userptr::{
    copy_from_user, copy_string_array_from_user, copy_string_from_user, copy_to_user,
    validate_user_range,
};
use super::{ErrorCode, SyscallFrame, SyscallResult};
use crate::console::STDIN;
use crate::process::creation::{MAX_ARGS, MAX_ARG_LEN};
use crate::process::{ProcessId, UserContext};
use crate::state::KernelState;

fn current_pid(kernel: &KernelState) -> Result<ProcessId, ErrorCode> {
    kernel.processes.current_pid().ok_or(ErrorCode::NoProcess)
}

/// sys_exit - Terminate the current process
///
/// The caller becomes a zombie (or disappears if it has no parent) and the
/// next ready process is scheduled. The dispatcher switches the frame over.
pub fn sys_exit(kernel: &mut KernelState, exit_code: i32) -> SyscallResult {
    let pid = match current_pid(kernel) {
        Ok(pid) => pid,
        Err(e) => return e.into(),
    };

    kernel.processes.exit_process(pid, exit_code);

    if kernel.processes.schedule_next().is_none() {
        log::info!("All processes have exited. Kernel continuing...");
    }

    SyscallResult::Ok(0)
}

/// sys_write - Write to a file descriptor
///
/// Only stdout and stderr exist.
pub fn sys_write(kernel: &mut KernelState, fd: u64, buf_ptr: u64, count: u64) -> SyscallResult {
    write_impl(kernel, fd, buf_ptr, count).into()
}

fn write_impl(kernel: &mut KernelState, fd: u64, buf_ptr: u64, count: u64) -> Result<u64, ErrorCode> {
    let KernelState {
        processes, console, ..
    } = kernel;

    if fd != crate::console::STDOUT && fd != crate::console::STDERR {
        return Err(ErrorCode::BadFd);
    }
    if count == 0 {
        return Ok(0);
    }

    let process = processes.current_process_mut().ok_or(ErrorCode::NoProcess)?;
    let len = usize::try_from(count).map_err(|_| ErrorCode::Fault)?;
    let data = copy_from_user(&process.memory, buf_ptr, len)?;

    if let Ok(s) = core::str::from_utf8(data) {
        log::debug!("USERSPACE OUTPUT (PID {}): {}", process.id, s.trim_end());
    }

    console.write(fd, data).ok_or(ErrorCode::BadFd)?;
    Ok(count)
}

/// sys_read - Read from a file descriptor
///
/// Only stdin exists. Returns 0 when no keyboard input is pending.
pub fn sys_read(kernel: &mut KernelState, fd: u64, buf_ptr: u64, count: u64) -> SyscallResult {
    read_impl(kernel, fd, buf_ptr, count).into()
}

fn read_impl(kernel: &mut KernelState, fd: u64, buf_ptr: u64, count: u64) -> Result<u64, ErrorCode> {
    let KernelState {
        processes, console, ..
    } = kernel;

    if fd != STDIN {
        return Err(ErrorCode::BadFd);
    }
    if count == 0 {
        return Ok(0);
    }

    let process = processes.current_process_mut().ok_or(ErrorCode::NoProcess)?;
    let len = usize::try_from(count).map_err(|_| ErrorCode::Fault)?;
    // Check the whole destination before consuming any input
    copy_from_user(&process.memory, buf_ptr, len)?;

    let mut chunk = [0u8; 64];
    let mut total = 0usize;
    while total < len {
        let want = core::cmp::min(chunk.len(), len - total);
        let got = console.read_input(&mut chunk[..want]);
        copy_to_user(&mut process.memory, buf_ptr + total as u64, &chunk[..got])?;
        total += got;
        if got < want {
            break;
        }
    }

    Ok(total as u64)
}

/// sys_yield - Yield CPU to another process
pub fn sys_yield(kernel: &mut KernelState) -> SyscallResult {
    kernel.processes.schedule_next();
    SyscallResult::Ok(0)
}

/// sys_get_time - Get current system time in ticks
pub fn sys_get_time(kernel: &mut KernelState) -> SyscallResult {
    SyscallResult::Ok(kernel.clock.ticks())
}

/// sys_fork - Duplicate the calling process
///
/// Needs the live frame: the parent's saved context is stale while it runs.
pub fn sys_fork_with_frame(kernel: &mut KernelState, frame: &SyscallFrame) -> SyscallResult {
    let parent = match current_pid(kernel) {
        Ok(pid) => pid,
        Err(e) => return e.into(),
    };
    let context = UserContext::from_frame(frame);

    kernel
        .processes
        .fork_process(parent, &context)
        .map(|child| child.as_u64())
        .into()
}

/// sys_wait - Reap one exited child
///
/// Non-blocking: `EAGAIN` while children exist but none has exited,
/// `ECHILD` without children. If `status_ptr` is non-null the child's exit
/// code is stored there as an `i32`.
pub fn sys_wait(kernel: &mut KernelState, status_ptr: u64) -> SyscallResult {
    wait_impl(kernel, status_ptr).into()
}

fn wait_impl(kernel: &mut KernelState, status_ptr: u64) -> Result<u64, ErrorCode> {
    let pid = current_pid(kernel)?;

    if status_ptr != 0 {
        // Validate before reaping so a bad pointer does not lose the child
        let process = kernel
            .processes
            .get_process(pid)
            .ok_or(ErrorCode::NoProcess)?;
        validate_user_range(status_ptr, 4)?;
        process.memory.read_bytes(status_ptr, 4)?;
    }

    let (child, code) = kernel.processes.reap_child(pid)?;

    if status_ptr != 0 {
        let process = kernel
            .processes
            .get_process_mut(pid)
            .ok_or(ErrorCode::NoProcess)?;
        copy_to_user(&mut process.memory, status_ptr, &code.to_le_bytes())?;
    }

    Ok(child.as_u64())
}

/// sys_exec - Replace the calling process's image
///
/// `path_ptr` is a NUL-terminated program name; `argv_ptr` is a
/// NULL-terminated array of string pointers, or null for `[path]`. On success
/// the frame is rewritten to enter the new image and argc is returned.
/// Syscall counting state is kept.
pub fn sys_exec_with_frame(
    kernel: &mut KernelState,
    frame: &mut SyscallFrame,
    path_ptr: u64,
    argv_ptr: u64,
) -> SyscallResult {
    exec_impl(kernel, frame, path_ptr, argv_ptr).into()
}

fn exec_impl(
    kernel: &mut KernelState,
    frame: &mut SyscallFrame,
    path_ptr: u64,
    argv_ptr: u64,
) -> Result<u64, ErrorCode> {
    let pid = current_pid(kernel)?;

    let (path, argv) = {
        let process = kernel
            .processes
            .get_process(pid)
            .ok_or(ErrorCode::NoProcess)?;
        let path = copy_string_from_user(&process.memory, path_ptr, MAX_ARG_LEN)?;
        let argv = if argv_ptr == 0 {
            vec![path.clone()]
        } else {
            copy_string_array_from_user(&process.memory, argv_ptr, MAX_ARGS, MAX_ARG_LEN)?
        };
        (path, argv)
    };

    let argc = kernel
        .processes
        .exec_process(pid, &path, argv)
        .map_err(|e| {
            log::info!("exec '{}' failed for PID {}: {}", path, pid, e);
            ErrorCode::from(e)
        })?;

    let process = kernel
        .processes
        .get_process(pid)
        .ok_or(ErrorCode::NoProcess)?;
    process.context.restore_into(frame);

    Ok(argc)
}

/// sys_getpid - Get the current process ID
pub fn sys_getpid(kernel: &mut KernelState) -> SyscallResult {
    current_pid(kernel).map(|pid| pid.as_u64()).into()
}

