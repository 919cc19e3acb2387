//! Per-process address space.
//!
//! A process sees one contiguous, zero-initialised region
//! `[USER_BASE, USER_BASE + size)`. The region is backed by a heap buffer
//! owned by the process control block, so it goes away with the process.
//!
//! All accessors take user virtual addresses and fail with
//! `ErrorCode::Fault` for anything outside the region, including ranges that
//! overflow.

use alloc::vec;
use alloc::vec::Vec;

use super::{STACK_ALIGN, USER_BASE};
use crate::syscall::ErrorCode;

/// A process's user memory.
#[derive(Clone)]
pub struct AddressSpace {
    base: u64,
    bytes: Vec<u8>,
}

impl AddressSpace {
    /// Create a zeroed address space of `size` bytes at `USER_BASE`.
    pub fn new(size: usize) -> Self {
        Self {
            base: USER_BASE,
            bytes: vec![0; size],
        }
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// One past the last mapped address. The initial stack grows down from here.
    pub fn top(&self) -> u64 {
        self.base + self.bytes.len() as u64
    }

    /// Translate `[addr, addr + len)` to an offset into the backing buffer.
    fn offset_of(&self, addr: u64, len: usize) -> Result<usize, ErrorCode> {
        if addr < self.base {
            return Err(ErrorCode::Fault);
        }
        let end = addr
            .checked_add(len as u64)
            .ok_or(ErrorCode::Fault)?;
        if end > self.top() {
            return Err(ErrorCode::Fault);
        }
        Ok((addr - self.base) as usize)
    }

    /// Borrow `len` bytes starting at `addr`.
    pub fn read_bytes(&self, addr: u64, len: usize) -> Result<&[u8], ErrorCode> {
        let start = self.offset_of(addr, len)?;
        Ok(&self.bytes[start..start + len])
    }

    /// Copy `data` into user memory at `addr`.
    pub fn write_bytes(&mut self, addr: u64, data: &[u8]) -> Result<(), ErrorCode> {
        let start = self.offset_of(addr, data.len())?;
        self.bytes[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    pub fn read_u64(&self, addr: u64) -> Result<u64, ErrorCode> {
        let raw = self.read_bytes(addr, 8)?;
        let mut word = [0u8; 8];
        word.copy_from_slice(raw);
        Ok(u64::from_le_bytes(word))
    }

    pub fn write_u64(&mut self, addr: u64, value: u64) -> Result<(), ErrorCode> {
        self.write_bytes(addr, &value.to_le_bytes())
    }

    /// Read a NUL-terminated string of at most `max_len` bytes (terminator excluded).
    ///
    /// Returns `NameTooLong` if no terminator appears within `max_len` bytes,
    /// and `Fault` if the string runs off the end of the region.
    pub fn read_cstr(&self, addr: u64, max_len: usize) -> Result<&[u8], ErrorCode> {
        let start = self.offset_of(addr, 0)?;
        let window_end = core::cmp::min(self.bytes.len(), start.saturating_add(max_len + 1));
        let window = &self.bytes[start..window_end];
        match window.iter().position(|&b| b == 0) {
            Some(len) => Ok(&window[..len]),
            None if window.len() > max_len => Err(ErrorCode::NameTooLong),
            None => Err(ErrorCode::Fault),
        }
    }
}

/// Builds the initial user stack for a new image, top down.
///
/// Layout after [`StackBuilder::finish`] (Linux x86_64 convention):
///
/// ```text
/// top ->  argv strings (NUL terminated)
///         padding to 16 bytes
///         NULL
///         argv[argc-1] .. argv[0]
/// sp  ->  argc
/// ```
pub struct StackBuilder<'a> {
    space: &'a mut AddressSpace,
    sp: u64,
}

impl<'a> StackBuilder<'a> {
    pub fn new(space: &'a mut AddressSpace) -> Self {
        let sp = space.top();
        Self { space, sp }
    }

    fn reserve(&mut self, len: u64) -> Result<u64, ErrorCode> {
        let new_sp = self
            .sp
            .checked_sub(len)
            .filter(|&sp| sp >= self.space.base())
            .ok_or(ErrorCode::ArgumentListTooLong)?;
        self.sp = new_sp;
        Ok(new_sp)
    }

    /// Push a string plus terminator and return its user address.
    pub fn push_str(&mut self, s: &[u8]) -> Result<u64, ErrorCode> {
        let addr = self.reserve(s.len() as u64 + 1)?;
        self.space.write_bytes(addr, s)?;
        self.space.write_bytes(addr + s.len() as u64, &[0])?;
        Ok(addr)
    }

    /// Write the pointer array and argc. Returns `(sp, argv_ptr)`.
    pub fn finish(mut self, argv_ptrs: &[u64]) -> Result<(u64, u64), ErrorCode> {
        // Align so that argc lands on a 16-byte boundary.
        let words = argv_ptrs.len() as u64 + 2;
        let unaligned = self
            .sp
            .checked_sub(words * 8)
            .ok_or(ErrorCode::ArgumentListTooLong)?;
        let aligned = unaligned & !(STACK_ALIGN - 1);
        self.reserve(self.sp - aligned - words * 8)?;

        self.reserve(8)?; // NULL terminator
        self.space.write_u64(self.sp, 0)?;
        for &ptr in argv_ptrs.iter().rev() {
            let slot = self.reserve(8)?;
            self.space.write_u64(slot, ptr)?;
        }
        let argv_ptr = self.sp;
        let argc_slot = self.reserve(8)?;
        self.space.write_u64(argc_slot, argv_ptrs.len() as u64)?;
        Ok((argc_slot, argv_ptr))
    }
}
