//! Angle → pulse-width mapping.
//!
//! A hobby servo reads its position from the high-time of a 50 Hz pulse
//! train: 0.5 ms is one end of travel, 2.5 ms the other.  [`ServoTiming`]
//! holds those limits and converts a whole-degree angle into the duty
//! (in nanoseconds) handed to the PWM channel.
//!
//! ```text
//!   duty_ns = min_duty + round((angle - min_angle) * (max_duty - min_duty)
//!                              / (max_angle - min_angle))
//! ```
//!
//! Out-of-range angles are saturated, never rejected.  Rejection is the
//! command boundary's job (see [`mod@crate::rpc::dispatch`]).

use serde::{Deserialize, Serialize};

pub const MIN_ANGLE: i32 = 0;
pub const MAX_ANGLE: i32 = 180;
/// Mid-travel; applied on every fresh initialization.
pub const DEFAULT_ANGLE: i32 = 90;

pub const MIN_DUTY_NS: u32 = 500_000; // 0.5 ms
pub const MAX_DUTY_NS: u32 = 2_500_000; // 2.5 ms
pub const PERIOD_NS: u32 = 20_000_000; // 20 ms (50 Hz)

/// Pulse limits for one servo model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServoTiming {
    pub min_angle: i32,
    pub max_angle: i32,
    pub min_duty_ns: u32,
    pub max_duty_ns: u32,
    pub period_ns: u32,
}

impl Default for ServoTiming {
    fn default() -> Self {
        Self {
            min_angle: MIN_ANGLE,
            max_angle: MAX_ANGLE,
            min_duty_ns: MIN_DUTY_NS,
            max_duty_ns: MAX_DUTY_NS,
            period_ns: PERIOD_NS,
        }
    }
}

impl ServoTiming {
    /// Saturate `angle` to the travel limits.
    ///
    /// With inverted limits the result is `max_angle`.
    pub fn clamp(&self, angle: i32) -> i32 {
        angle.max(self.min_angle).min(self.max_angle)
    }

    /// Whether `angle` lies within travel without clamping.
    pub fn contains(&self, angle: i32) -> bool {
        (self.min_angle..=self.max_angle).contains(&angle)
    }

    /// Duty (ns) for `angle`, after clamping.
    ///
    /// Integer arithmetic, rounded to the nearest nanosecond.  A timing that
    /// fails [`validate`](Self::validate) with an empty angle or duty range
    /// maps every angle to `min_duty_ns`.
    pub fn duty_ns(&self, angle: i32) -> u32 {
        let from_min = |a: i32| (i64::from(a) - i64::from(self.min_angle)).max(0) as u64;
        let offset = from_min(self.clamp(angle));
        let range = from_min(self.max_angle);
        let span = u64::from(self.max_duty_ns.saturating_sub(self.min_duty_ns));

        let scaled = (offset * span + range / 2).checked_div(range).unwrap_or(0);
        self.min_duty_ns + scaled as u32
    }

    /// Range-check every field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.min_angle < -360 || self.max_angle > 360 {
            return Err("angle limits must lie within -360..=360");
        }
        if self.min_angle >= self.max_angle {
            return Err("min_angle must be below max_angle");
        }
        if self.min_duty_ns >= self.max_duty_ns {
            return Err("min_duty_ns must be below max_duty_ns");
        }
        if self.period_ns == 0 {
            return Err("period_ns must be non-zero");
        }
        if self.max_duty_ns > self.period_ns {
            return Err("max_duty_ns must not exceed period_ns");
        }
        Ok(())
    }
}
