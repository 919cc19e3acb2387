//! Console device.
//!
//! Output written by processes is captured per stream so the boot code can
//! forward it to the serial port and tests can inspect it. Each stream keeps
//! at most `output_capacity` bytes; once full, the oldest bytes are dropped
//! until someone drains it with [`Console::take_output`]. Input arrives from
//! the keyboard interrupt through a bounded lock-free queue.

use alloc::vec::Vec;
use crossbeam_queue::ArrayQueue;

pub const STDIN: u64 = 0;
pub const STDOUT: u64 = 1;
pub const STDERR: u64 = 2;

pub struct Console {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    output_capacity: usize,
    input: ArrayQueue<u8>,
}

impl Console {
    pub fn new(input_capacity: usize, output_capacity: usize) -> Self {
        Self {
            stdout: Vec::new(),
            stderr: Vec::new(),
            output_capacity,
            // ArrayQueue panics on zero capacity
            input: ArrayQueue::new(input_capacity.max(1)),
        }
    }

    /// Append `data` to the stream behind `fd`, dropping the oldest bytes
    /// past the capacity. Returns `None` for fds that are not output streams.
    pub fn write(&mut self, fd: u64, data: &[u8]) -> Option<usize> {
        let stream = match fd {
            STDOUT => &mut self.stdout,
            STDERR => &mut self.stderr,
            _ => return None,
        };
        let keep = core::cmp::min(data.len(), self.output_capacity);
        let overflow = (stream.len() + keep).saturating_sub(self.output_capacity);
        stream.drain(..overflow);
        stream.extend_from_slice(&data[data.len() - keep..]);
        Some(data.len())
    }

    /// Queue one byte of keyboard input. Returns false if the queue is full.
    pub fn push_input(&self, byte: u8) -> bool {
        self.input.push(byte).is_ok()
    }

    /// Move pending input into `buf`. Never blocks; returns 0 when idle.
    pub fn read_input(&self, buf: &mut [u8]) -> usize {
        let mut n = 0;
        while n < buf.len() {
            match self.input.pop() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        n
    }

    pub fn stdout(&self) -> &[u8] {
        &self.stdout
    }

    pub fn stderr(&self) -> &[u8] {
        &self.stderr
    }

    /// Hand captured output to the caller and clear it.
    pub fn take_output(&mut self) -> (Vec<u8>, Vec<u8>) {
        (
            core::mem::take(&mut self.stdout),
            core::mem::take(&mut self.stderr),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_go_to_their_stream() {
        let mut console = Console::new(4, 64);
        assert_eq!(console.write(STDOUT, b"out"), Some(3));
        assert_eq!(console.write(STDERR, b"err"), Some(3));
        assert_eq!(console.write(STDIN, b"x"), None);
        assert_eq!(console.write(7, b"x"), None);
        assert_eq!(console.stdout(), b"out");
        assert_eq!(console.stderr(), b"err");

        let (out, err) = console.take_output();
        assert_eq!((out.as_slice(), err.as_slice()), (&b"out"[..], &b"err"[..]));
        assert!(console.stdout().is_empty());
    }

    #[test]
    fn output_keeps_the_newest_bytes() {
        let mut console = Console::new(1, 4);
        assert_eq!(console.write(STDOUT, b"abc"), Some(3));
        assert_eq!(console.write(STDOUT, b"def"), Some(3));
        assert_eq!(console.stdout(), b"cdef");

        // A single write larger than the capacity keeps its tail
        assert_eq!(console.write(STDERR, b"0123456789"), Some(10));
        assert_eq!(console.stderr(), b"6789");

        console.take_output();
        assert_eq!(console.write(STDOUT, b"xy"), Some(2));
        assert_eq!(console.stdout(), b"xy");
    }

    #[test]
    fn input_is_bounded_and_fifo() {
        let console = Console::new(2, 64);
        assert!(console.push_input(b'a'));
        assert!(console.push_input(b'b'));
        assert!(!console.push_input(b'c'));

        let mut buf = [0u8; 8];
        assert_eq!(console.read_input(&mut buf), 2);
        assert_eq!(&buf[..2], b"ab");
        assert_eq!(console.read_input(&mut buf), 0);
    }
}
