//! Process image replacement (exec)
//!
//! Unlike fork(), which creates a new process, exec() replaces the current
//! process's image while keeping the same PID and control block. Only the
//! image-derived fields change; parent/children links and syscall counting
//! state carry over untouched.

use alloc::string::String;
use alloc::vec::Vec;

use super::creation::LoadedImage;
use super::Process;
use crate::config::ProgramImage;

/// Install a freshly loaded image into `process`.
pub fn replace_image(
    process: &mut Process,
    image: &ProgramImage,
    loaded: LoadedImage,
    argv: Vec<String>,
) {
    log::info!(
        "exec: PID {} '{}' -> '{}'",
        process.id,
        process.name,
        image.name
    );

    process.name = String::from(image.name);
    process.entry_point = image.entry_point;
    process.memory = loaded.memory;
    process.context = loaded.context;
    process.argv = argv;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{AddressSpace, USER_BASE};
    use crate::process::creation::load_image;
    use crate::process::{ProcessId, UserContext};
    use crate::syscall::SyscallNumber;
    use crate::tracing::SyscallMask;

    #[test]
    fn replacement_keeps_identity_and_accounting() {
        let mut process = Process::new(
            ProcessId::new(4),
            String::from("syscount"),
            USER_BASE + 0x4000,
            AddressSpace::new(4096),
            UserContext::default(),
        );
        process.parent = Some(ProcessId::new(1));
        let mask = SyscallMask::from_bits(0xF);
        process.syscount.install_mask(mask);
        process.syscount.record(SyscallNumber::Write);

        let echo = ProgramImage::new("echo", USER_BASE + 0x2000);
        let argv = alloc::vec![String::from("echo")];
        let loaded = load_image(&echo, &argv, 4096).unwrap();
        replace_image(&mut process, &echo, loaded, argv);

        assert_eq!(process.id, ProcessId::new(4));
        assert_eq!(process.parent, Some(ProcessId::new(1)));
        assert_eq!(process.name, "echo");
        assert_eq!(process.context.rip, USER_BASE + 0x2000);
        assert_eq!(process.syscount.mask(), mask);
        assert_eq!(process.syscount.counters().get(SyscallNumber::Write), 1);
    }
}
