//! Kernel configuration.
//!
//! Boot code builds a [`KernelConfig`] (usually [`KernelConfig::default`])
//! and hands it to [`crate::state::init`].

use log::LevelFilter;

use crate::logger::LogSink;
use crate::memory::USER_BASE;

/// A program the kernel can start by name.
///
/// Images are linked into the kernel; `exec` only needs the entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramImage {
    pub name: &'static str,
    pub entry_point: u64,
}

impl ProgramImage {
    pub const fn new(name: &'static str, entry_point: u64) -> Self {
        Self { name, entry_point }
    }
}

/// Programs available to `exec` out of the box.
pub const BUILTIN_PROGRAMS: &[ProgramImage] = &[
    ProgramImage::new("init", USER_BASE),
    ProgramImage::new("sh", USER_BASE + 0x1000),
    ProgramImage::new("echo", USER_BASE + 0x2000),
    ProgramImage::new("cat", USER_BASE + 0x3000),
    ProgramImage::new("syscount", USER_BASE + 0x4000),
];

#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Upper bound on live (including zombie) processes.
    pub max_processes: usize,
    /// Bytes of user memory per process.
    pub user_memory_size: usize,
    /// Keyboard bytes buffered before input is dropped.
    pub console_input_capacity: usize,
    /// Bytes of output kept per console stream until it is drained.
    pub console_output_capacity: usize,
    pub log_level: LevelFilter,
    /// Where log lines go besides the kmsg buffer (the serial port).
    pub log_sink: Option<LogSink>,
    /// Program table searched by `exec`.
    pub programs: &'static [ProgramImage],
}

impl KernelConfig {
    /// Look a program up by name. A single leading `/` is ignored.
    pub fn find_program(&self, name: &str) -> Option<&'static ProgramImage> {
        let name = name.strip_prefix('/').unwrap_or(name);
        self.programs.iter().find(|image| image.name == name)
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            max_processes: 64,
            user_memory_size: 64 * 1024,
            console_input_capacity: 256,
            console_output_capacity: 64 * 1024,
            log_level: LevelFilter::Info,
            log_sink: None,
            programs: BUILTIN_PROGRAMS,
        }
    }
}
