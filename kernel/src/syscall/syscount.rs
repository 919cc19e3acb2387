//! GetSysCount - the counting control syscall
//!
//! `getsyscount(mask)` installs `mask` as the caller's counting mask and
//! returns how many syscalls were counted under the mask it replaces. The
//! counters themselves are never cleared, so a later call that re-selects a
//! syscall sees everything counted for it so far.
//!
//! The dispatcher counts a syscall before running its handler, so a
//! `getsyscount` issued while its own bit is set is included in the total it
//! returns.

use super::{ErrorCode, SyscallResult};
use crate::state::KernelState;
use crate::tracing::SyscallMask;

/// Largest total reported; anything above would read as `-errno`.
const MAX_REPORTED: u64 = i64::MAX as u64;

pub fn sys_getsyscount(kernel: &mut KernelState, mask: u64) -> SyscallResult {
    let process = match kernel.processes.current_process_mut() {
        Some(process) => process,
        None => return ErrorCode::NoProcess.into(),
    };

    let mask = SyscallMask::from_bits(mask);
    let previous_total = process.syscount.install_mask(mask);

    log::debug!(
        "getsyscount: PID {} mask {} (previous total {})",
        process.id,
        mask,
        previous_total
    );

    SyscallResult::Ok(previous_total.min(MAX_REPORTED))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KernelConfig;
    use crate::syscall::SyscallNumber;
    use alloc::string::String;
    use alloc::vec;

    fn kernel_with_process() -> KernelState {
        let mut kernel = KernelState::new(KernelConfig::default());
        let pid = kernel
            .processes
            .create_process("init", vec![String::from("init")])
            .unwrap();
        kernel.processes.set_current_pid(pid);
        kernel
    }

    #[test]
    fn no_current_process_is_esrch() {
        let mut kernel = KernelState::new(KernelConfig::default());
        assert_eq!(
            sys_getsyscount(&mut kernel, 1),
            SyscallResult::Err(ErrorCode::NoProcess as u64)
        );
    }

    #[test]
    fn installs_mask_and_reports_previous_total() {
        let mut kernel = kernel_with_process();
        assert_eq!(sys_getsyscount(&mut kernel, 0x2), SyscallResult::Ok(0));

        let process = kernel.processes.current_process_mut().unwrap();
        assert_eq!(process.syscount.mask().bits(), 0x2);
        process.syscount.record(SyscallNumber::Write);
        process.syscount.record(SyscallNumber::Write);

        assert_eq!(sys_getsyscount(&mut kernel, 0), SyscallResult::Ok(2));
        assert_eq!(sys_getsyscount(&mut kernel, 0), SyscallResult::Ok(0));
    }

    #[test]
    fn unknown_bits_are_accepted() {
        let mut kernel = kernel_with_process();
        assert_eq!(sys_getsyscount(&mut kernel, u64::MAX), SyscallResult::Ok(0));
        let process = kernel.processes.current_process_mut().unwrap();
        assert_eq!(process.syscount.mask().bits(), u64::MAX);
    }
}
