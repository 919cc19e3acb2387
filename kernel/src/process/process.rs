//! Process structure and lifecycle

use alloc::string::String;
use alloc::vec::Vec;

use crate::memory::AddressSpace;
use crate::syscall::SyscallFrame;
use crate::tracing::SyscallAccounting;

/// User code segment selector (RPL 3)
pub const USER_CODE_SELECTOR: u64 = 0x33;
/// User data segment selector (RPL 3)
pub const USER_DATA_SELECTOR: u64 = 0x2b;
/// IF set, reserved bit 1 set
const INITIAL_RFLAGS: u64 = 0x202;

/// Process ID type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(u64);

impl ProcessId {
    pub const fn new(id: u64) -> Self {
        ProcessId(id)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Process is ready to run
    Ready,
    /// Process is currently running
    Running,
    /// Process has terminated and waits to be reaped
    Terminated(i32),
}

/// Saved user register state of a process that is not on the CPU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserContext {
    pub rax: u64,
    pub rbx: u64,
    pub rcx: u64,
    pub rdx: u64,
    pub rsi: u64,
    pub rdi: u64,
    pub rbp: u64,
    pub rsp: u64,
    pub r8: u64,
    pub r9: u64,
    pub r10: u64,
    pub r11: u64,
    pub r12: u64,
    pub r13: u64,
    pub r14: u64,
    pub r15: u64,
    pub rip: u64,
    pub rflags: u64,
    pub cs: u64,
    pub ss: u64,
}

impl UserContext {
    /// Context for a fresh image: entry at `rip`, stack at `rsp`.
    pub fn new(rip: u64, rsp: u64) -> Self {
        Self {
            rip,
            rsp,
            rflags: INITIAL_RFLAGS,
            cs: USER_CODE_SELECTOR,
            ss: USER_DATA_SELECTOR,
            ..Self::default()
        }
    }

    /// Capture the registers userspace had at syscall time.
    pub fn from_frame(frame: &SyscallFrame) -> Self {
        Self {
            rax: frame.rax,
            rbx: frame.rbx,
            rcx: frame.rcx,
            rdx: frame.rdx,
            rsi: frame.rsi,
            rdi: frame.rdi,
            rbp: frame.rbp,
            rsp: frame.rsp,
            r8: frame.r8,
            r9: frame.r9,
            r10: frame.r10,
            r11: frame.r11,
            r12: frame.r12,
            r13: frame.r13,
            r14: frame.r14,
            r15: frame.r15,
            rip: frame.rip,
            rflags: frame.rflags,
            cs: frame.cs,
            ss: frame.ss,
        }
    }

    /// Load this context into `frame` so IRETQ resumes it.
    pub fn restore_into(&self, frame: &mut SyscallFrame) {
        frame.rax = self.rax;
        frame.rbx = self.rbx;
        frame.rcx = self.rcx;
        frame.rdx = self.rdx;
        frame.rsi = self.rsi;
        frame.rdi = self.rdi;
        frame.rbp = self.rbp;
        frame.rsp = self.rsp;
        frame.r8 = self.r8;
        frame.r9 = self.r9;
        frame.r10 = self.r10;
        frame.r11 = self.r11;
        frame.r12 = self.r12;
        frame.r13 = self.r13;
        frame.r14 = self.r14;
        frame.r15 = self.r15;
        frame.rip = self.rip;
        frame.rflags = self.rflags;
        frame.cs = self.cs;
        frame.ss = self.ss;
    }
}

/// A process represents a running program with its own address space
pub struct Process {
    /// Unique process identifier
    pub id: ProcessId,

    /// Name of the current image
    pub name: String,

    /// Current state
    pub state: ProcessState,

    /// Entry point of the current image
    pub entry_point: u64,

    /// Parent process ID (if any)
    pub parent: Option<ProcessId>,

    /// Child processes, live or zombie
    pub children: Vec<ProcessId>,

    /// Exit code (if terminated)
    pub exit_code: Option<i32>,

    /// Registers to resume with when this process is next scheduled
    pub context: UserContext,

    /// User memory
    pub memory: AddressSpace,

    /// Argument vector of the current image
    pub argv: Vec<String>,

    /// Syscall counting state. Survives exec, starts fresh on fork.
    pub syscount: SyscallAccounting,
}

impl Process {
    /// Create a new process
    pub fn new(
        id: ProcessId,
        name: String,
        entry_point: u64,
        memory: AddressSpace,
        context: UserContext,
    ) -> Self {
        Process {
            id,
            name,
            state: ProcessState::Ready,
            entry_point,
            parent: None,
            children: Vec::new(),
            exit_code: None,
            context,
            memory,
            argv: Vec::new(),
            syscount: SyscallAccounting::new(),
        }
    }

    /// Mark process as running
    pub fn set_running(&mut self) {
        self.state = ProcessState::Running;
    }

    /// Mark process as ready
    pub fn set_ready(&mut self) {
        self.state = ProcessState::Ready;
    }

    /// Terminate the process
    pub fn terminate(&mut self, exit_code: i32) {
        self.state = ProcessState::Terminated(exit_code);
        self.exit_code = Some(exit_code);
    }

    /// Check if process is terminated
    pub fn is_terminated(&self) -> bool {
        matches!(self.state, ProcessState::Terminated(_))
    }

    /// Add a child process
    pub fn add_child(&mut self, child_id: ProcessId) {
        self.children.push(child_id);
    }

    /// Remove a child process
    pub fn remove_child(&mut self, child_id: ProcessId) {
        self.children.retain(|&id| id != child_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_survives_a_frame_round_trip() {
        let mut ctx = UserContext::new(0x1000_2000, 0x1000_f000);
        ctx.rax = 42;
        ctx.r12 = 7;

        let mut frame = SyscallFrame::default();
        ctx.restore_into(&mut frame);
        assert!(frame.is_from_userspace());
        assert_eq!(UserContext::from_frame(&frame), ctx);
    }

    #[test]
    fn terminate_records_exit_code() {
        let mut process = Process::new(
            ProcessId::new(3),
            String::from("echo"),
            0,
            AddressSpace::new(64),
            UserContext::default(),
        );
        assert!(!process.is_terminated());
        process.terminate(5);
        assert!(process.is_terminated());
        assert_eq!(process.exit_code, Some(5));
    }
}
