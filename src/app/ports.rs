//! Port traits: the boundary between the servo controller and the platform.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ServoController (domain)
//! ```
//!
//! Driven adapters (PWM hardware, node registry, config source) implement
//! these traits.  The [`ServoController`](super::controller::ServoController)
//! consumes them via generics, so the domain core never touches hardware
//! directly.
//!
//! ## Ownership notes
//!
//! - A [`PwmChannel`] value *is* the exclusive claim on one output line.
//!   [`PwmChannel::release`] consumes it, so a released channel can neither
//!   be released again nor configured.
//! - [`NodeRegistry::unregister`] likewise consumes the node handle.

use crate::config::ServoConfig;
use crate::error::{HardwareError, RegistrationError};

// ───────────────────────────────────────────────────────────────
// PWM ports (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Source of PWM channels on a platform.
pub trait PwmProvider {
    type Channel: PwmChannel;

    /// Claim a channel.
    ///
    /// `Some(name)` asks for a specific channel; `None` asks for the
    /// platform's first channel by index.  A channel that is already
    /// claimed must be refused.
    fn request(&mut self, name: Option<&str>) -> Result<Self::Channel, HardwareError>;
}

/// One claimed PWM output line.
pub trait PwmChannel {
    /// Program high-time and period, both in nanoseconds.
    fn configure(&mut self, duty_ns: u32, period_ns: u32) -> Result<(), HardwareError>;

    /// Start driving the output.  Enabling an enabled channel is not an error.
    fn enable(&mut self) -> Result<(), HardwareError>;

    /// Stop driving the output.  Disabling a disabled channel is not an error.
    fn disable(&mut self) -> Result<(), HardwareError>;

    /// Give the line back to the platform.  Best-effort; never fails.
    fn release(self);
}

// ───────────────────────────────────────────────────────────────
// Node registry port (driven adapter: domain → command interface host)
// ───────────────────────────────────────────────────────────────

/// Creates and removes the named node through which commands arrive.
pub trait NodeRegistry {
    type Node;

    fn register(&mut self, name: &str) -> Result<Self::Node, RegistrationError>;

    fn unregister(&mut self, node: Self::Node);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: config source → domain)
// ───────────────────────────────────────────────────────────────

/// Loads driver configuration.
///
/// Implementations MUST validate before returning: invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], never clamped.
pub trait ConfigPort {
    /// Returns [`ConfigError::NotFound`] when no override exists, so the
    /// caller can fall back to [`ServoConfig::default()`].
    fn load(&self) -> Result<ServoConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No configuration source present.
    NotFound,
    /// Source exists but failed to deserialize.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the source.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
