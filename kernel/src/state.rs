//! Global kernel state.
//!
//! Everything the syscall layer touches lives in one [`KernelState`] behind
//! one lock. Interrupt handlers (timer, keyboard) also need it, so on bare
//! metal the lock is only ever taken with interrupts disabled.

use spin::Mutex;

use crate::config::KernelConfig;
use crate::console::Console;
use crate::process::ProcessManager;

/// Monotonic tick counter driven by the timer interrupt.
#[derive(Debug, Default)]
pub struct Clock {
    ticks: u64,
}

impl Clock {
    pub const fn new() -> Self {
        Self { ticks: 0 }
    }

    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

pub struct KernelState {
    pub processes: ProcessManager,
    pub console: Console,
    pub clock: Clock,
}

impl KernelState {
    pub fn new(config: KernelConfig) -> Self {
        let console = Console::new(
            config.console_input_capacity,
            config.console_output_capacity,
        );
        Self {
            processes: ProcessManager::new(config),
            console,
            clock: Clock::new(),
        }
    }
}

/// Global kernel state
pub static KERNEL: Mutex<Option<KernelState>> = Mutex::new(None);

/// Install fresh kernel state built from `config`
pub fn init(config: KernelConfig) {
    let state = KernelState::new(config);
    run_masked(|| *KERNEL.lock() = Some(state));
    log::info!("Kernel state initialized");
}

/// Run `f` with the kernel state while interrupts are disabled.
///
/// Returns `None` before [`init`] has run.
pub fn with_kernel<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut KernelState) -> R,
{
    run_masked(|| {
        let mut guard = KERNEL.lock();
        guard.as_mut().map(f)
    })
}

/// Timer interrupt hook
pub fn timer_tick() {
    with_kernel(|kernel| kernel.clock.tick());
}

/// Keyboard interrupt hook. Drops the byte if the input queue is full.
pub fn keyboard_input(byte: u8) {
    let _ = with_kernel(|kernel| kernel.console.push_input(byte));
}

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
fn run_masked<F: FnOnce() -> R, R>(f: F) -> R {
    x86_64::instructions::interrupts::without_interrupts(f)
}

// Hosted builds have no interrupts to mask.
#[cfg(not(all(target_arch = "x86_64", target_os = "none")))]
fn run_masked<F: FnOnce() -> R, R>(f: F) -> R {
    f()
}
