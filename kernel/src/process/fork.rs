//! Unix fork() semantics
//!
//! The child gets a full copy of the parent's address space and registers,
//! with RAX forced to 0 so fork() returns 0 in the child. Everything else the
//! child owns starts fresh, including syscall counting (mask 0, counts 0).

use alloc::string::String;

use super::{Process, ProcessId, UserContext};

/// Build the child control block for a fork of `parent`.
///
/// `context` is the parent's register state at the fork syscall; the parent's
/// saved context in its control block is stale while it is on the CPU.
pub fn duplicate_process(parent: &Process, child_pid: ProcessId, context: &UserContext) -> Process {
    let mut child_context = *context;
    child_context.rax = 0;

    let mut child = Process::new(
        child_pid,
        String::from(parent.name.as_str()),
        parent.entry_point,
        parent.memory.clone(),
        child_context,
    );
    child.parent = Some(parent.id);
    child.argv = parent.argv.clone();

    log::debug!(
        "duplicate_process: parent {} -> child {} ({} bytes copied)",
        parent.id,
        child_pid,
        parent.memory.size()
    );

    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{AddressSpace, USER_BASE};
    use crate::syscall::SyscallNumber;
    use crate::tracing::SyscallMask;

    fn parent() -> Process {
        let mut memory = AddressSpace::new(128);
        memory.write_bytes(USER_BASE, b"parent data").unwrap();
        let mut p = Process::new(
            ProcessId::new(1),
            String::from("sh"),
            USER_BASE,
            memory,
            UserContext::new(USER_BASE, USER_BASE + 128),
        );
        p.syscount
            .install_mask(SyscallMask::NONE.with(SyscallNumber::Fork));
        p.syscount.record(SyscallNumber::Fork);
        p
    }

    #[test]
    fn child_copies_memory_and_registers() {
        let parent = parent();
        let mut ctx = UserContext::new(USER_BASE + 0x40, USER_BASE + 0x80);
        ctx.rax = SyscallNumber::Fork as u64;
        ctx.rbx = 99;

        let child = duplicate_process(&parent, ProcessId::new(2), &ctx);
        assert_eq!(child.parent, Some(ProcessId::new(1)));
        assert_eq!(child.context.rax, 0);
        assert_eq!(child.context.rbx, 99);
        assert_eq!(child.context.rip, USER_BASE + 0x40);
        assert_eq!(child.memory.read_bytes(USER_BASE, 11).unwrap(), b"parent data");
    }

    #[test]
    fn child_starts_with_fresh_accounting() {
        let parent = parent();
        assert_eq!(parent.syscount.counters().grand_total(), 1);

        let child = duplicate_process(&parent, ProcessId::new(2), &parent.context);
        assert_eq!(child.syscount.mask(), SyscallMask::NONE);
        assert_eq!(child.syscount.counters().grand_total(), 0);
    }
}
