//! Application core: servo domain logic behind port traits.
//!
//! The controller never touches hardware directly: channels come from a
//! [`ports::PwmProvider`] and the command node from a [`ports::NodeRegistry`],
//! so the whole lifecycle runs against mocks in tests.

pub mod commands;
pub mod controller;
pub mod ports;
