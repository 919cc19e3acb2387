//! System call dispatcher
//!
//! Routes system calls to their appropriate handlers based on the syscall
//! number. This is the single place every syscall passes through, so the
//! per-process counting hook lives here.

use super::handlers;
use super::syscount::sys_getsyscount;
use super::{ErrorCode, SyscallFrame, SyscallNumber, SyscallResult};
use crate::process::UserContext;
use crate::state::KernelState;

/// Dispatch the syscall in `frame` and store the result in its RAX.
///
/// If the handler changed the current process (exit, yield), the frame is
/// saved into the old process and replaced with the new one's context, so the
/// IRETQ that follows resumes whoever is current now.
pub fn dispatch(kernel: &mut KernelState, frame: &mut SyscallFrame) {
    let syscall_num = frame.syscall_number();
    let caller = kernel.processes.current_pid();

    let syscall = match SyscallNumber::from_u64(syscall_num) {
        Some(s) => s,
        None => {
            log::warn!("Invalid syscall number: {}", syscall_num);
            frame.set_return_value(SyscallResult::from(ErrorCode::NoSys).to_raw());
            return;
        }
    };

    // Count before the handler runs: exit never comes back, and getsyscount
    // must see its own call under the mask it is replacing.
    if let Some(process) = kernel.processes.current_process_mut() {
        process.syscount.record(syscall);
    }

    #[cfg(feature = "syscall_trace")]
    log::trace!(
        "syscall {} ({}) from PID {:?}",
        syscall.name(),
        syscall_num,
        caller.map(|pid| pid.as_u64())
    );

    let (arg1, arg2, arg3, _, _, _) = frame.args();

    let result = match syscall {
        SyscallNumber::Exit => handlers::sys_exit(kernel, arg1 as i32),
        SyscallNumber::Write => handlers::sys_write(kernel, arg1, arg2, arg3),
        SyscallNumber::Read => handlers::sys_read(kernel, arg1, arg2, arg3),
        SyscallNumber::Yield => handlers::sys_yield(kernel),
        SyscallNumber::GetTime => handlers::sys_get_time(kernel),
        SyscallNumber::Fork => handlers::sys_fork_with_frame(kernel, frame),
        SyscallNumber::Wait => handlers::sys_wait(kernel, arg1),
        SyscallNumber::Exec => handlers::sys_exec_with_frame(kernel, frame, arg1, arg2),
        SyscallNumber::GetPid => handlers::sys_getpid(kernel),
        SyscallNumber::GetSysCount => sys_getsyscount(kernel, arg1),
    };

    frame.set_return_value(result.to_raw());

    let current = kernel.processes.current_pid();
    if current == caller {
        return;
    }

    if let Some(old) = caller.and_then(|pid| kernel.processes.get_process_mut(pid)) {
        old.context = UserContext::from_frame(frame);
    }
    match current.and_then(|pid| kernel.processes.get_process(pid)) {
        Some(next) => next.context.restore_into(frame),
        None => log::info!("No runnable process, kernel idles"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KernelConfig;
    use crate::process::ProcessId;
    use alloc::string::String;
    use alloc::vec;

    fn kernel() -> (KernelState, ProcessId) {
        let mut kernel = KernelState::new(KernelConfig::default());
        let pid = kernel
            .processes
            .create_process("init", vec![String::from("init")])
            .unwrap();
        kernel.processes.set_current_pid(pid);
        (kernel, pid)
    }

    fn call(kernel: &mut KernelState, nr: SyscallNumber, arg: u64) -> i64 {
        let mut frame = SyscallFrame::for_syscall(nr as u64, [arg, 0, 0]);
        dispatch(kernel, &mut frame);
        frame.return_value()
    }

    #[test]
    fn unknown_syscall_is_enosys_and_uncounted() {
        let (mut kernel, pid) = kernel();
        call(&mut kernel, SyscallNumber::GetSysCount, u64::MAX);

        let mut frame = SyscallFrame::for_syscall(200, [0; 3]);
        dispatch(&mut kernel, &mut frame);
        assert_eq!(frame.return_value(), ErrorCode::NoSys.as_negative());

        // The getsyscount ran under the empty mask it replaced
        let process = kernel.processes.get_process(pid).unwrap();
        assert_eq!(process.syscount.counters().grand_total(), 0);

        call(&mut kernel, SyscallNumber::GetPid, 0);
        let process = kernel.processes.get_process(pid).unwrap();
        assert_eq!(process.syscount.counters().grand_total(), 1);
    }

    #[test]
    fn hook_counts_before_handler() {
        let (mut kernel, _) = kernel();
        let getsyscount = 1u64 << SyscallNumber::GetSysCount as u64;
        assert_eq!(call(&mut kernel, SyscallNumber::GetSysCount, getsyscount), 0);
        // Second call is counted under the first mask before it is replaced
        assert_eq!(call(&mut kernel, SyscallNumber::GetSysCount, 0), 1);
    }

    #[test]
    fn yield_switches_frames_between_processes() {
        let (mut kernel, init) = kernel();
        let sh = kernel
            .processes
            .create_process("sh", vec![String::from("sh")])
            .unwrap();
        let sh_entry = kernel.processes.get_process(sh).unwrap().context.rip;

        // The ready queue still starts with init, so rotate once to reach sh
        let mut frame = SyscallFrame::for_syscall(SyscallNumber::Yield as u64, [0; 3]);
        frame.rbx = 0xaaaa;
        dispatch(&mut kernel, &mut frame);
        if kernel.processes.current_pid() == Some(init) {
            frame.rax = SyscallNumber::Yield as u64;
            dispatch(&mut kernel, &mut frame);
        }

        assert_eq!(kernel.processes.current_pid(), Some(sh));
        assert_eq!(frame.rip, sh_entry);
        let saved = kernel.processes.get_process(init).unwrap().context;
        assert_eq!(saved.rbx, 0xaaaa);
        assert_eq!(saved.rax, 0);
    }

    #[test]
    fn exit_of_last_process_leaves_kernel_idle() {
        let (mut kernel, _) = kernel();
        let mut frame = SyscallFrame::for_syscall(SyscallNumber::Exit as u64, [0; 3]);
        dispatch(&mut kernel, &mut frame);
        assert_eq!(kernel.processes.current_pid(), None);
        assert_eq!(kernel.processes.process_count(), 0);
    }
}
