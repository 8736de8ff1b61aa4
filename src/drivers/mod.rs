//! Hardware-facing helpers shared by every PWM backend.

pub mod pwm;
