//! syscount - count the syscalls a command makes
//!
//! Usage: syscount <mask> <command> [args...]
//!
//! Installs <mask> as this process's syscall counting mask, then replaces
//! itself with <command>. Bit N of the mask selects syscall number N. The
//! kernel keeps the mask and the counters across exec, so the counts reflect
//! the command's own syscalls only.
//!
//! <mask> is parsed like C `atoi`: leading whitespace, an optional sign,
//! then decimal digits up to the first non-digit. Anything else reads as 0.

use std::ffi::CString;
use std::io::Write;

use libtally::{io, process as tally_process, syscount, Error};

const USAGE: &str = "Usage: syscount <mask> <command> [args]\n";

/// The two kernel operations the front end needs.
trait Launcher {
    /// Install `mask`, returning the total under the previous mask.
    fn set_counting_mask(&mut self, mask: u64) -> Result<u64, Error>;

    /// Replace this process with `command`. Only returns on failure.
    fn exec(&mut self, command: &str, argv: &[String]) -> Error;
}

struct KernelLauncher;

impl Launcher for KernelLauncher {
    fn set_counting_mask(&mut self, mask: u64) -> Result<u64, Error> {
        syscount::get_sys_count(mask)
    }

    fn exec(&mut self, command: &str, argv: &[String]) -> Error {
        // Arguments with interior NULs cannot be passed through
        let path = match CString::new(command) {
            Ok(p) => p,
            Err(_) => return Error::Os(libtally::Errno::EINVAL),
        };
        let owned: Result<Vec<CString>, _> = argv.iter().map(|a| CString::new(a.as_str())).collect();
        let owned = match owned {
            Ok(v) => v,
            Err(_) => return Error::Os(libtally::Errno::EINVAL),
        };
        let refs: Vec<&std::ffi::CStr> = owned.iter().map(|c| c.as_c_str()).collect();
        tally_process::exec(&path, &refs)
    }
}

/// C `atoi`: never fails, stops at the first character that does not fit.
fn atoi(s: &str) -> i64 {
    let s = s.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.wrapping_mul(10).wrapping_add(i64::from(b - b'0'));
    }
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

/// Mask from the command line. Negative values keep their bit pattern.
fn parse_mask(arg: &str) -> u64 {
    atoi(arg) as u64
}

/// Run the front end with `args` (including argv[0]). Returns the exit code
/// for the failure paths; on success `exec` does not come back.
fn run(args: &[String], launcher: &mut impl Launcher, stderr: &mut impl Write) -> i32 {
    if args.len() < 3 {
        let _ = stderr.write_all(USAGE.as_bytes());
        return 1;
    }

    let mask = parse_mask(&args[1]);
    if launcher.set_counting_mask(mask).is_err() {
        let _ = stderr.write_all(b"syscount: getSysCount failed\n");
        return 1;
    }

    let command = &args[2];
    launcher.exec(command, &args[2..]);
    let _ = writeln!(stderr, "syscount: exec {} failed", command);
    1
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let code = run(&args, &mut KernelLauncher, &mut io::stderr());
    tally_process::exit(code);
}
