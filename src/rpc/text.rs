//! Line-oriented console protocol.
//!
//! One command per line:
//!
//! | Input          | Meaning                 |
//! |----------------|-------------------------|
//! | `q…`, `Q…`     | end the session         |
//! | `get`, `?`     | [`ServoCommand::GetAngle`] |
//! | integer        | [`ServoCommand::SetAngle`] |
//!
//! Any line starting with `q` or `Q` quits, so `quit` and `Quit` work too.
//! Surrounding whitespace is ignored.  Anything else, including integers
//! that do not fit an `i32`, is [`CommandError::Malformed`].

use crate::app::commands::ServoCommand;
use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleInput {
    Command(ServoCommand),
    Quit,
}

pub fn parse_line(line: &str) -> Result<ConsoleInput, CommandError> {
    match line.trim() {
        word if word.starts_with(['q', 'Q']) => Ok(ConsoleInput::Quit),
        "get" | "?" => Ok(ConsoleInput::Command(ServoCommand::GetAngle)),
        word => word
            .parse()
            .map(|angle| ConsoleInput::Command(ServoCommand::SetAngle(angle)))
            .map_err(|_| CommandError::Malformed),
    }
}
