//! echo - print arguments to stdout
//!
//! Usage: echo [STRING]...
//!
//! Prints the arguments separated by spaces, followed by a newline.

use libtally::io::{stderr, stdout};
use libtally::process::exit;

fn line(args: &[String]) -> String {
    let mut out = args.join(" ");
    out.push('\n');
    out
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if stdout().write_str(&line(&args)).is_err() {
        let _ = stderr().write_str("echo: write error\n");
        exit(1);
    }
    exit(0);
}
