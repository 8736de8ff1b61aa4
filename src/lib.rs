//! SG90 servo driver library.
//!
//! Drives a hobby servo through a PWM channel: angle-to-pulse mapping,
//! channel acquisition with fallback, an init/teardown lifecycle with
//! ordered rollback, and a small validated command interface.  Platform
//! access sits behind the port traits in [`app::ports`]; [`adapters`]
//! supplies Linux sysfs, `embedded-hal`, and in-memory implementations.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod rpc;

mod error;

pub use app::commands::{CommandReply, ServoCommand};
pub use app::controller::{ControllerState, ServoController};
pub use config::ServoConfig;
pub use error::*;
