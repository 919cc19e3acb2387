// Hot path: runs for every int 0x80. No allocation or logging outside the
// syscall_trace feature, and the kernel lock is held only for the dispatch.

use super::ErrorCode;
use crate::process::process::{USER_CODE_SELECTOR, USER_DATA_SELECTOR};

#[repr(C)]
#[derive(Debug, Clone, Default)]
pub struct SyscallFrame {
    // General purpose registers (in memory order after all pushes)
    // Stack grows down, so last pushed is at lowest address (where RSP points)
    // Assembly pushes: rax first, then rcx, rdx, rbx, rbp, rsi, rdi, r8-r15
    // So r15 (pushed last) is at RSP+0, and rax (pushed first) is at RSP+112
    pub r15: u64, // pushed last, at RSP+0
    pub r14: u64, // at RSP+8
    pub r13: u64, // at RSP+16
    pub r12: u64, // at RSP+24
    pub r11: u64, // at RSP+32
    pub r10: u64, // at RSP+40
    pub r9: u64,  // at RSP+48
    pub r8: u64,  // at RSP+56
    pub rdi: u64, // at RSP+64
    pub rsi: u64, // at RSP+72
    pub rbp: u64, // at RSP+80
    pub rbx: u64, // at RSP+88
    pub rdx: u64, // at RSP+96
    pub rcx: u64, // at RSP+104
    pub rax: u64, // Syscall number - pushed first, at RSP+112

    // Interrupt frame (pushed by CPU before our code)
    pub rip: u64,
    pub cs: u64,
    pub rflags: u64,
    pub rsp: u64,
    pub ss: u64,
}

impl SyscallFrame {
    /// A ring 3 frame as `int 0x80` would leave it for syscall `nr`.
    ///
    /// Used by the boot code's self tests and by host-side tests.
    pub fn for_syscall(nr: u64, args: [u64; 3]) -> Self {
        Self {
            rax: nr,
            rdi: args[0],
            rsi: args[1],
            rdx: args[2],
            cs: USER_CODE_SELECTOR,
            ss: USER_DATA_SELECTOR,
            rflags: 0x202,
            ..Self::default()
        }
    }

    /// Check if this syscall came from userspace
    pub fn is_from_userspace(&self) -> bool {
        // Check CS register - if RPL (bits 0-1) is 3, it's from userspace
        (self.cs & 0x3) == 3
    }

    /// Get syscall number
    pub fn syscall_number(&self) -> u64 {
        self.rax
    }

    /// Get syscall arguments (following System V ABI)
    pub fn args(&self) -> (u64, u64, u64, u64, u64, u64) {
        (self.rdi, self.rsi, self.rdx, self.r10, self.r8, self.r9)
    }

    /// Set return value
    pub fn set_return_value(&mut self, value: u64) {
        self.rax = value;
    }

    /// Return value as userspace reads it
    pub fn return_value(&self) -> i64 {
        self.rax as i64
    }
}

/// Main syscall handler called from assembly
#[no_mangle]
pub extern "C" fn rust_syscall_handler(frame: &mut SyscallFrame) {
    // Verify this came from userspace (security check)
    if !frame.is_from_userspace() {
        log::warn!("Syscall from kernel mode - this shouldn't happen!");
        frame.set_return_value(u64::MAX); // Error
        return;
    }

    let handled = crate::state::with_kernel(|kernel| super::dispatch(kernel, frame));
    if handled.is_none() {
        // No kernel state, so there is no calling process either
        frame.set_return_value(ErrorCode::NoProcess.as_negative() as u64);
    }
}
