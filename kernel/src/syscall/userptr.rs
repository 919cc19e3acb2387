//! Userspace pointer validation and safe memory operations
//!
//! Syscall arguments that name user memory are raw addresses chosen by
//! untrusted code. Everything here checks them before touching memory:
//! - null pointers
//! - addresses at or above the kernel split
//! - ranges whose end overflows or leaves the process's address space
//!
//! Every failure is `ErrorCode::Fault` (EFAULT), except over-long strings.

use alloc::string::String;
use alloc::vec::Vec;

use super::ErrorCode;
use crate::memory::{AddressSpace, USER_SPACE_END};

/// Validate that `[addr, addr + len)` is a plausible user range.
///
/// This only checks the range shape; the address space accessors check
/// that it is actually mapped.
pub fn validate_user_range(addr: u64, len: u64) -> Result<(), ErrorCode> {
    if addr == 0 {
        return Err(ErrorCode::Fault);
    }
    if addr >= USER_SPACE_END {
        return Err(ErrorCode::Fault);
    }
    if addr.checked_add(len).map_or(true, |end| end > USER_SPACE_END) {
        return Err(ErrorCode::Fault);
    }
    Ok(())
}

/// Copy `len` bytes out of user memory.
pub fn copy_from_user<'a>(
    space: &'a AddressSpace,
    addr: u64,
    len: usize,
) -> Result<&'a [u8], ErrorCode> {
    validate_user_range(addr, len as u64)?;
    space.read_bytes(addr, len)
}

/// Copy `data` into user memory.
pub fn copy_to_user(space: &mut AddressSpace, addr: u64, data: &[u8]) -> Result<(), ErrorCode> {
    validate_user_range(addr, data.len() as u64)?;
    space.write_bytes(addr, data)
}

/// Read one machine word.
pub fn read_user_u64(space: &AddressSpace, addr: u64) -> Result<u64, ErrorCode> {
    validate_user_range(addr, 8)?;
    space.read_u64(addr)
}

/// Write one machine word.
pub fn write_user_u64(space: &mut AddressSpace, addr: u64, value: u64) -> Result<(), ErrorCode> {
    validate_user_range(addr, 8)?;
    space.write_u64(addr, value)
}

/// Copy a NUL-terminated UTF-8 string of at most `max_len` bytes.
///
/// Invalid UTF-8 is rejected with `EINVAL`.
pub fn copy_string_from_user(
    space: &AddressSpace,
    addr: u64,
    max_len: usize,
) -> Result<String, ErrorCode> {
    validate_user_range(addr, 1)?;
    let bytes = space.read_cstr(addr, max_len)?;
    core::str::from_utf8(bytes)
        .map(String::from)
        .map_err(|_| ErrorCode::InvalidArgument)
}

/// Copy a NULL-terminated array of string pointers (`char *const argv[]`).
///
/// At most `max_items` entries are accepted before the terminator
/// (`E2BIG` otherwise); each string is limited to `max_len` bytes.
pub fn copy_string_array_from_user(
    space: &AddressSpace,
    addr: u64,
    max_items: usize,
    max_len: usize,
) -> Result<Vec<String>, ErrorCode> {
    let mut items = Vec::new();
    let mut slot = addr;
    loop {
        let ptr = read_user_u64(space, slot)?;
        if ptr == 0 {
            return Ok(items);
        }
        if items.len() == max_items {
            return Err(ErrorCode::ArgumentListTooLong);
        }
        items.push(copy_string_from_user(space, ptr, max_len)?);
        slot = slot.checked_add(8).ok_or(ErrorCode::Fault)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::USER_BASE;

    #[test]
    fn validation_rejects_bad_ranges() {
        assert_eq!(validate_user_range(0, 8), Err(ErrorCode::Fault));
        assert_eq!(validate_user_range(USER_SPACE_END, 1), Err(ErrorCode::Fault));
        assert_eq!(
            validate_user_range(USER_SPACE_END - 4, 8),
            Err(ErrorCode::Fault)
        );
        assert_eq!(validate_user_range(u64::MAX, 2), Err(ErrorCode::Fault));
        assert!(validate_user_range(USER_BASE, 8).is_ok());
    }

    #[test]
    fn copies_respect_the_address_space() {
        let mut space = AddressSpace::new(256);
        copy_to_user(&mut space, USER_BASE + 8, b"abc").unwrap();
        assert_eq!(copy_from_user(&space, USER_BASE + 8, 3).unwrap(), b"abc");

        // Plausible user address, but not mapped in this process.
        assert_eq!(
            copy_from_user(&space, USER_BASE + 0x10_0000, 1),
            Err(ErrorCode::Fault)
        );
    }

    #[test]
    fn string_array_is_null_terminated() {
        let mut space = AddressSpace::new(256);
        copy_to_user(&mut space, USER_BASE + 64, b"echo\0hi\0").unwrap();
        write_user_u64(&mut space, USER_BASE, USER_BASE + 64).unwrap();
        write_user_u64(&mut space, USER_BASE + 8, USER_BASE + 69).unwrap();
        write_user_u64(&mut space, USER_BASE + 16, 0).unwrap();

        let argv = copy_string_array_from_user(&space, USER_BASE, 4, 16).unwrap();
        assert_eq!(argv, ["echo", "hi"]);

        assert_eq!(
            copy_string_array_from_user(&space, USER_BASE, 1, 16),
            Err(ErrorCode::ArgumentListTooLong)
        );
    }

    #[test]
    fn strings_must_be_utf8() {
        let mut space = AddressSpace::new(64);
        copy_to_user(&mut space, USER_BASE, &[0xff, 0xfe, 0]).unwrap();
        assert_eq!(
            copy_string_from_user(&space, USER_BASE, 16),
            Err(ErrorCode::InvalidArgument)
        );
    }
}
