//! User memory management.
//!
//! Each process owns one flat [`AddressSpace`] mapped at [`USER_BASE`]. Fork
//! clones it, exec replaces it, and reaping a process frees it.

pub mod process_memory;

pub use process_memory::AddressSpace;

/// First user virtual address. Null and the low pages are never mapped.
pub const USER_BASE: u64 = 0x1000_0000;

/// Userspace ends below the canonical kernel split.
pub const USER_SPACE_END: u64 = 0x0000_8000_0000_0000;

/// User stack and argument area alignment.
pub const STACK_ALIGN: u64 = 16;
