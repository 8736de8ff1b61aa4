//! Servo position math.

pub mod angle;
