use conquer_once::spin::OnceCell;
use core::fmt::{self, Write};
use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;

const BUFFER_SIZE: usize = 8192;

/// Output sink for formatted log lines (the serial port on hardware).
pub type LogSink = fn(&str);

static SINK: OnceCell<LogSink> = OnceCell::uninit();

/// Kernel message buffer, readable through [`read_all`]
struct LogBuffer {
    buffer: [u8; BUFFER_SIZE],
    position: usize,
}

impl LogBuffer {
    const fn new() -> Self {
        Self {
            buffer: [0; BUFFER_SIZE],
            position: 0,
        }
    }

    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let remaining = BUFFER_SIZE - self.position;

        if bytes.len() > remaining {
            // Full: keep the oldest messages, drop the new one
            return Ok(());
        }

        self.buffer[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();

        Ok(())
    }

    fn contents(&self) -> &str {
        core::str::from_utf8(&self.buffer[..self.position]).unwrap_or("<invalid UTF-8>")
    }
}

impl Write for LogBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_str(s)
    }
}

/// Small stack buffer so the sink gets one complete line per record.
struct LineBuffer {
    bytes: [u8; 256],
    len: usize,
}

impl LineBuffer {
    const fn new() -> Self {
        Self {
            bytes: [0; 256],
            len: 0,
        }
    }

    fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes[..self.len]).unwrap_or("<invalid UTF-8>")
    }
}

impl Write for LineBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        // Truncate long lines rather than fail the whole record
        let room = self.bytes.len() - self.len;
        let mut take = core::cmp::min(room, s.len());
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.bytes[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

pub struct KernelLogger {
    buffer: Mutex<LogBuffer>,
}

impl KernelLogger {
    const fn new() -> Self {
        KernelLogger {
            buffer: Mutex::new(LogBuffer::new()),
        }
    }
}

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut line = LineBuffer::new();
        let _ = write!(
            &mut line,
            "[{:>5}] {}: {}\n",
            record.level(),
            record.target(),
            record.args()
        );

        // Use try_lock to avoid deadlocks from interrupt context. A record
        // that loses the race still reaches the sink.
        if let Some(mut buffer) = self.buffer.try_lock() {
            let _ = buffer.write_str(line.as_str());
        }

        if let Some(sink) = SINK.get() {
            sink(line.as_str());
        }
    }

    fn flush(&self) {}
}

pub static KERNEL_LOGGER: KernelLogger = KernelLogger::new();

/// Install the kernel logger at `level`.
///
/// Fails if another logger was installed first.
pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_logger(&KERNEL_LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Forward every formatted line to `sink` as well. Only the first call wins.
pub fn set_sink(sink: LogSink) {
    let _ = SINK.try_init_once(|| sink);
}

/// Copy of everything buffered so far.
pub fn read_all() -> alloc::string::String {
    let buffer = KERNEL_LOGGER.buffer.lock();
    alloc::string::String::from(buffer.contents())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn buffer_drops_messages_that_do_not_fit() {
        let mut buffer = LogBuffer::new();
        buffer.write_str("boot\n").unwrap();
        let big = "x".repeat(BUFFER_SIZE);
        buffer.write_str(&big).unwrap();
        assert_eq!(buffer.contents(), "boot\n");
    }

    #[test]
    fn line_buffer_truncates_on_char_boundary() {
        let mut line = LineBuffer::new();
        let long = "é".repeat(200);
        line.write_str(&long).unwrap();
        assert!(line.as_str().len() <= 256);
        assert!(line.as_str().chars().all(|c| c == 'é'));
    }

    static SINK_LINES: AtomicUsize = AtomicUsize::new(0);

    fn counting_sink(line: &str) {
        if line.contains("sink_test") {
            SINK_LINES.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn sink_receives_whole_lines() {
        set_sink(counting_sink);
        let _ = init(LevelFilter::Info);
        log::warn!(target: "sink_test", "to the serial port");
        assert_eq!(SINK_LINES.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn records_land_in_kmsg() {
        // Another test binary thread may have installed it already
        let _ = init(LevelFilter::Info);
        log::info!(target: "logger_test", "hello kmsg");
        let all = read_all();
        assert!(all.contains("logger_test: hello kmsg"));
    }
}
