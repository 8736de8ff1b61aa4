//! Error types for the servo driver.
//!
//! Layered the same way the driver is: channel-level [`HardwareError`]s are
//! wrapped by the controller's [`InitError`] and [`ControlError`], and the
//! command boundary adds [`CommandError`].  A single [`Error`] enum collects
//! all of them for callers that want uniform handling.
//! All variants are `Copy`.

use core::fmt;

use crate::app::controller::ControllerState;

// ---------------------------------------------------------------------------
// errno values reported at the command boundary
// ---------------------------------------------------------------------------

pub const EIO: i32 = 5;
pub const EFAULT: i32 = 14;
pub const ENODEV: i32 = 19;
pub const EINVAL: i32 = 22;
pub const ENOTTY: i32 = 25;
pub const ERANGE: i32 = 34;

// ---------------------------------------------------------------------------
// Hardware (channel-level) errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareError {
    /// No candidate channel (named or by index) could be acquired.
    ChannelUnavailable,
    /// The platform refused the duty/period pair, or the channel is busy.
    ConfigurationRejected,
    /// The platform refused to switch the output on or off.
    EnableRejected,
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelUnavailable => write!(f, "no PWM channel available"),
            Self::ConfigurationRejected => write!(f, "PWM configuration rejected"),
            Self::EnableRejected => write!(f, "PWM enable/disable rejected"),
        }
    }
}

impl std::error::Error for HardwareError {}

// ---------------------------------------------------------------------------
// Node registration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    /// Another live node already holds this name.
    NameInUse,
    /// The name is empty, too long, or contains forbidden characters.
    InvalidName,
    /// The registry backend failed.
    Io,
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameInUse => write!(f, "node name already in use"),
            Self::InvalidName => write!(f, "invalid node name"),
            Self::Io => write!(f, "node registry I/O error"),
        }
    }
}

impl std::error::Error for RegistrationError {}

// ---------------------------------------------------------------------------
// Controller errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// `initialize` called outside `Uninitialized`.
    InvalidState(ControllerState),
    /// Every channel candidate was refused.
    NoChannel,
    /// The command node could not be registered; the channel was released.
    RegistrationFailed(RegistrationError),
    /// The default position could not be applied; everything was unwound.
    DefaultApplyFailed(ControlError),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidState(s) => write!(f, "cannot initialize from state {s:?}"),
            Self::NoChannel => write!(f, "failed to get any PWM device"),
            Self::RegistrationFailed(e) => write!(f, "node registration failed: {e}"),
            Self::DefaultApplyFailed(e) => write!(f, "default position not applied: {e}"),
        }
    }
}

impl std::error::Error for InitError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    /// The controller is not in `Ready`.
    NotReady,
    /// `configure` failed; the committed angle is unchanged.
    ConfigFailed(HardwareError),
    /// `enable` failed after a successful `configure`; the committed angle is unchanged.
    EnableFailed(HardwareError),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "servo not ready"),
            Self::ConfigFailed(e) => write!(f, "failed to configure PWM: {e}"),
            Self::EnableFailed(e) => write!(f, "failed to enable PWM: {e}"),
        }
    }
}

impl std::error::Error for ControlError {}

// ---------------------------------------------------------------------------
// Command boundary errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Set-angle input outside the servo's travel; rejected before the controller.
    AngleOutOfRange(i32),
    /// Input could not be parsed or decoded.
    Malformed,
    /// Raw command code is not a servo command.
    UnknownCommand(u32),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AngleOutOfRange(a) => write!(f, "angle {a} out of range"),
            Self::Malformed => write!(f, "malformed command"),
            Self::UnknownCommand(code) => write!(f, "unknown command: 0x{code:x}"),
        }
    }
}

impl std::error::Error for CommandError {}

// ---------------------------------------------------------------------------
// Crate-wide error
// ---------------------------------------------------------------------------

/// Every fallible operation in the driver funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Hardware(HardwareError),
    Registration(RegistrationError),
    Init(InitError),
    Control(ControlError),
    Command(CommandError),
}

impl Error {
    /// Positive errno reported to command-interface callers.
    pub fn errno(&self) -> i32 {
        match self {
            Self::Hardware(HardwareError::ChannelUnavailable)
            | Self::Init(InitError::NoChannel)
            | Self::Control(ControlError::NotReady) => ENODEV,
            Self::Hardware(HardwareError::ConfigurationRejected)
            | Self::Control(ControlError::ConfigFailed(_)) => EINVAL,
            Self::Hardware(HardwareError::EnableRejected)
            | Self::Control(ControlError::EnableFailed(_))
            | Self::Registration(_)
            | Self::Init(_) => EIO,
            Self::Command(CommandError::AngleOutOfRange(_)) => ERANGE,
            Self::Command(CommandError::Malformed) => EFAULT,
            Self::Command(CommandError::UnknownCommand(_)) => ENOTTY,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hardware(e) => write!(f, "hardware: {e}"),
            Self::Registration(e) => write!(f, "registration: {e}"),
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Control(e) => write!(f, "control: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<HardwareError> for Error {
    fn from(e: HardwareError) -> Self {
        Self::Hardware(e)
    }
}

impl From<RegistrationError> for Error {
    fn from(e: RegistrationError) -> Self {
        Self::Registration(e)
    }
}

impl From<InitError> for Error {
    fn from(e: InitError) -> Self {
        Self::Init(e)
    }
}

impl From<ControlError> for Error {
    fn from(e: ControlError) -> Self {
        Self::Control(e)
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
