//! Inbound commands to the servo controller.
//!
//! These are the two requests the outside world (console, framed binary
//! link, raw ioctl-style callers) can make.  The `rpc` layer validates
//! them before they reach the controller.

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

// ── ioctl-compatible codes ────────────────────────────────────

const IOC_WRITE: u32 = 1;
const IOC_READ: u32 = 2;

/// Linux `_IOC(dir, type, nr, size)` encoding.
const fn ioc(dir: u32, kind: u8, nr: u8, size: u32) -> u32 {
    (dir << 30) | (size << 16) | ((kind as u32) << 8) | nr as u32
}

const SERVO_MAGIC: u8 = b'S';
const INT_SIZE: u32 = 4;

/// `_IOW('S', 1, int)`
pub const SERVO_SET_ANGLE: u32 = ioc(IOC_WRITE, SERVO_MAGIC, 1, INT_SIZE);
/// `_IOR('S', 2, int)`
pub const SERVO_GET_ANGLE: u32 = ioc(IOC_READ, SERVO_MAGIC, 2, INT_SIZE);

/// Commands accepted by the controller's command interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServoCommand {
    /// Move to the given angle in whole degrees.
    SetAngle(i32),
    /// Report the last committed angle.
    GetAngle,
}

/// Successful outcome of a [`ServoCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandReply {
    Done,
    Angle(i32),
}

impl ServoCommand {
    /// The ioctl code this command travels under.
    pub fn code(&self) -> u32 {
        match self {
            Self::SetAngle(_) => SERVO_SET_ANGLE,
            Self::GetAngle => SERVO_GET_ANGLE,
        }
    }

    /// Decode an ioctl-style `(code, arg)` pair.  `arg` is ignored for gets.
    pub fn from_raw(code: u32, arg: i32) -> Result<Self, CommandError> {
        match code {
            SERVO_SET_ANGLE => Ok(Self::SetAngle(arg)),
            SERVO_GET_ANGLE => Ok(Self::GetAngle),
            other => Err(CommandError::UnknownCommand(other)),
        }
    }
}
