//! Driver configuration parameters
//!
//! Everything tunable about one servo: which PWM channels to try, the
//! command-node name, pulse limits, and the power-on position.
//! Overrides can be loaded through a [`ConfigPort`](crate::app::ports::ConfigPort);
//! nothing is persisted back.

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::adapters::utils::is_valid_node_name;
use crate::app::ports::ConfigError;
use crate::control::angle::{DEFAULT_ANGLE, ServoTiming};

/// Capacity of every name field (channel candidates, node name).
pub const NAME_CAPACITY: usize = 32;
/// Maximum number of named channel candidates.
pub const MAX_CANDIDATES: usize = 4;

pub type Name = String<NAME_CAPACITY>;

/// Channel names tried when no configuration is supplied: the chip name,
/// the PWM3 controller address on i.MX6ULL, and the device-tree label.
pub const DEFAULT_CANDIDATES: [&str; 3] = ["pwmchip2", "2030000.pwm", "sg90"];
pub const DEFAULT_NODE_NAME: &str = "sg90";

/// Core driver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoConfig {
    // --- PWM ---
    /// Channel names tried in order before the index fallback
    pub channel_candidates: Vec<Name, MAX_CANDIDATES>,

    // --- Command interface ---
    /// Name the command node is registered under
    pub node_name: Name,

    // --- Servo ---
    /// Pulse limits
    pub timing: ServoTiming,
    /// Angle applied during initialization (degrees)
    pub default_angle: i32,
}

impl Default for ServoConfig {
    fn default() -> Self {
        let mut channel_candidates = Vec::new();
        for candidate in DEFAULT_CANDIDATES {
            let _ = channel_candidates.push(name(candidate));
        }

        Self {
            channel_candidates,
            node_name: name(DEFAULT_NODE_NAME),
            timing: ServoTiming::default(),
            default_angle: DEFAULT_ANGLE,
        }
    }
}

impl ServoConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate().map_err(ConfigError::ValidationFailed)?;

        if !self.timing.contains(self.default_angle) {
            return Err(ConfigError::ValidationFailed(
                "default_angle must lie within min_angle..=max_angle",
            ));
        }
        if !is_valid_node_name(&self.node_name) {
            return Err(ConfigError::ValidationFailed(
                "node_name must be non-empty printable ASCII without '/'",
            ));
        }
        if self.channel_candidates.iter().any(|c| c.is_empty()) {
            return Err(ConfigError::ValidationFailed(
                "channel_candidates must not contain empty names",
            ));
        }
        Ok(())
    }

    /// Candidate names as plain string slices, in try order.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        self.channel_candidates.iter().map(Name::as_str)
    }
}

/// Build a bounded name from a literal known to fit.
fn name(s: &str) -> Name {
    let mut out = Name::new();
    let pushed = out.push_str(s);
    debug_assert!(pushed.is_ok(), "name literal exceeds {NAME_CAPACITY} bytes: {s}");
    out
}
