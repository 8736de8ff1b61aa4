//! Fuzz target: console line parser
//!
//! Any UTF-8 line must parse or be rejected without panicking, and a
//! set-angle must carry exactly the integer that was typed.
//!
//! cargo fuzz run fuzz_console_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use sg90::ServoCommand;
use sg90::rpc::text::{ConsoleInput, parse_line};

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(ConsoleInput::Command(ServoCommand::SetAngle(angle))) = parse_line(line) {
        assert_eq!(line.trim().parse::<i32>().ok(), Some(angle));
    }
});
