//! Building the initial user image of a process.
//!
//! Programs are linked into the kernel, so "loading" one means giving it a
//! fresh zeroed address space and an initial stack holding its arguments.

use alloc::string::String;

use super::{ProcessError, UserContext};
use crate::config::ProgramImage;
use crate::memory::process_memory::StackBuilder;
use crate::memory::AddressSpace;

/// Most arguments an image may be started with.
pub const MAX_ARGS: usize = 32;

/// Longest path or argument string, terminator excluded.
pub const MAX_ARG_LEN: usize = 256;

/// A loaded image ready to be attached to a process.
pub struct LoadedImage {
    pub memory: AddressSpace,
    pub context: UserContext,
    pub argc: u64,
}

/// Check `argv` against the argument limits.
pub fn validate_args(argv: &[String]) -> Result<(), ProcessError> {
    if argv.len() > MAX_ARGS {
        return Err(ProcessError::ArgumentsTooLarge);
    }
    if argv.iter().any(|arg| arg.len() > MAX_ARG_LEN) {
        return Err(ProcessError::NameTooLong);
    }
    Ok(())
}

/// Create the address space and entry context for `image` run with `argv`.
///
/// On entry `rsp` points at argc, `rdi` holds argc and `rsi` the argv array.
pub fn load_image(
    image: &ProgramImage,
    argv: &[String],
    memory_size: usize,
) -> Result<LoadedImage, ProcessError> {
    validate_args(argv)?;

    let mut memory = AddressSpace::new(memory_size);
    let (sp, argv_ptr) = {
        let mut stack = StackBuilder::new(&mut memory);
        let mut ptrs = [0u64; MAX_ARGS];
        for (slot, arg) in ptrs.iter_mut().zip(argv) {
            *slot = stack.push_str(arg.as_bytes())?;
        }
        stack.finish(&ptrs[..argv.len()])?
    };

    let argc = argv.len() as u64;
    let mut context = UserContext::new(image.entry_point, sp);
    context.rdi = argc;
    context.rsi = argv_ptr;

    log::debug!(
        "load_image: {} entry={:#x} sp={:#x} argc={}",
        image.name,
        image.entry_point,
        sp,
        argc
    );

    Ok(LoadedImage {
        memory,
        context,
        argc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    const ECHO: ProgramImage = ProgramImage::new("echo", 0x1000_2000);

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| String::from(*s)).collect()
    }

    #[test]
    fn entry_context_points_at_arguments() {
        let image = load_image(&ECHO, &args(&["echo", "hi"]), 4096).unwrap();
        let ctx = image.context;

        assert_eq!(image.argc, 2);
        assert_eq!(ctx.rip, ECHO.entry_point);
        assert_eq!(ctx.rdi, 2);
        assert_eq!(image.memory.read_u64(ctx.rsp).unwrap(), 2);
        assert_eq!(ctx.rsi, ctx.rsp + 8);

        let arg1 = image.memory.read_u64(ctx.rsi + 8).unwrap();
        assert_eq!(image.memory.read_cstr(arg1, MAX_ARG_LEN).unwrap(), b"hi");
    }

    #[test]
    fn enforces_argument_limits() {
        let many = vec![String::from("x"); MAX_ARGS + 1];
        assert_eq!(
            load_image(&ECHO, &many, 4096).err(),
            Some(ProcessError::ArgumentsTooLarge)
        );

        let long = vec![String::from("y").repeat(MAX_ARG_LEN + 1)];
        assert_eq!(
            load_image(&ECHO, &long, 4096).err(),
            Some(ProcessError::NameTooLong)
        );
    }

    #[test]
    fn arguments_must_fit_user_memory() {
        let big = vec![String::from("z").repeat(200); 4];
        assert_eq!(
            load_image(&ECHO, &big, 256).err(),
            Some(ProcessError::ArgumentsTooLarge)
        );
    }
}
