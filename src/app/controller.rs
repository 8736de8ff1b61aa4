//! Servo controller: the domain core.
//!
//! [`ServoController`] owns one PWM channel and the command node, converts
//! angles into pulse widths, and remembers the last angle it actually
//! committed.  All I/O flows through the port traits it is built with, so
//! the whole lifecycle is testable with mock adapters.
//!
//! ```text
//!  PwmProvider ──▶ ┌────────────────────────┐
//!                  │    ServoController     │ ◀── set_angle / get_angle
//! NodeRegistry ◀── │  lifecycle · mapping   │
//!                  └────────────────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized ──initialize──▶ Initializing ──ok──▶ Ready ──shutdown──▶ ShuttingDown ──▶ Released
//!                                     │                                                    ▲
//!                                     └──────────────── any failure (unwound) ─────────────┘
//! ```
//!
//! Resources acquired during `initialize` push an undo step; a failure
//! pops and runs them, newest first, so every exit path releases exactly
//! what was taken.

use heapless::Vec;
use log::{error, info, warn};

use crate::config::ServoConfig;
use crate::drivers::pwm::{self, ChannelSource, PwmHandle};
use crate::error::{ControlError, InitError};

use super::ports::{ConfigError, NodeRegistry, PwmProvider};

/// Controller lifecycle.  Only `Ready` accepts commands; `Released` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Initializing,
    Ready,
    ShuttingDown,
    Released,
}

/// Reverse-order cleanup for a partially completed `initialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UndoStep {
    ReleaseChannel,
    UnregisterNode,
}

/// One resource per step; sized for everything `initialize` acquires.
const UNDO_CAPACITY: usize = 2;

pub struct ServoController<P: PwmProvider, R: NodeRegistry> {
    config: ServoConfig,
    provider: P,
    registry: R,
    channel: Option<PwmHandle<P::Channel>>,
    node: Option<R::Node>,
    undo: Vec<UndoStep, UNDO_CAPACITY>,
    /// Last committed angle (degrees).
    angle: i32,
    state: ControllerState,
}

impl<P: PwmProvider, R: NodeRegistry> ServoController<P, R> {
    /// Build an idle controller.  Nothing is acquired until [`initialize`](Self::initialize).
    pub fn new(config: ServoConfig, provider: P, registry: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let angle = config.default_angle;
        Ok(Self {
            config,
            provider,
            registry,
            channel: None,
            node: None,
            undo: Vec::new(),
            angle,
            state: ControllerState::Uninitialized,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Acquire the channel, register the node, and move to the default angle.
    ///
    /// On any failure everything acquired so far is released in reverse
    /// order and the controller ends in `Released`.
    pub fn initialize(&mut self) -> Result<(), InitError> {
        if self.state != ControllerState::Uninitialized {
            return Err(InitError::InvalidState(self.state));
        }
        self.state = ControllerState::Initializing;

        // 1. PWM channel
        match pwm::acquire(&mut self.provider, self.config.candidates()) {
            Ok(channel) => {
                info!("Using PWM device {}", channel.source());
                self.channel = Some(channel);
                self.push_undo(UndoStep::ReleaseChannel);
            }
            Err(e) => {
                error!("Failed to get any PWM device: {}", e);
                self.state = ControllerState::Released;
                return Err(InitError::NoChannel);
            }
        }

        // 2. Command node
        match self.registry.register(&self.config.node_name) {
            Ok(node) => {
                self.node = Some(node);
                self.push_undo(UndoStep::UnregisterNode);
            }
            Err(e) => {
                error!("Failed to register node '{}': {}", self.config.node_name, e);
                self.unwind();
                return Err(InitError::RegistrationFailed(e));
            }
        }

        // 3. Default position
        if let Err(e) = self.apply(self.config.default_angle) {
            error!("Failed to apply default angle: {}", e);
            self.unwind();
            return Err(InitError::DefaultApplyFailed(e));
        }

        self.undo.clear();
        self.state = ControllerState::Ready;
        info!("Servo driver initialized successfully");
        Ok(())
    }

    /// Disable the output, release the channel, unregister the node.
    ///
    /// Never fails and may be called any number of times.  Disable errors
    /// are logged and ignored: the channel is released regardless.
    pub fn shutdown(&mut self) {
        if matches!(
            self.state,
            ControllerState::Released | ControllerState::ShuttingDown
        ) {
            return;
        }
        self.state = ControllerState::ShuttingDown;

        if let Some(mut channel) = self.channel.take() {
            if let Err(e) = channel.disable() {
                warn!("PWM disable failed during shutdown: {}", e);
            }
            channel.release();
        }
        if let Some(node) = self.node.take() {
            self.registry.unregister(node);
        }

        self.undo.clear();
        self.state = ControllerState::Released;
        info!("Servo driver exited");
    }

    // ── Commands ──────────────────────────────────────────────

    /// Move to `angle`, saturated to the travel limits.
    ///
    /// The committed angle changes only if both `configure` and `enable`
    /// succeed.
    pub fn set_angle(&mut self, angle: i32) -> Result<(), ControlError> {
        if self.state != ControllerState::Ready {
            return Err(ControlError::NotReady);
        }
        self.apply(angle)
    }

    /// Last committed angle.
    pub fn get_angle(&self) -> Result<i32, ControlError> {
        if self.state != ControllerState::Ready {
            return Err(ControlError::NotReady);
        }
        Ok(self.angle)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ControllerState::Ready
    }

    pub fn config(&self) -> &ServoConfig {
        &self.config
    }

    /// How the bound channel was found, while one is held.
    pub fn channel_source(&self) -> Option<&ChannelSource> {
        self.channel.as_ref().map(PwmHandle::source)
    }

    /// Duty currently programmed on the bound channel (ns).
    pub fn duty_ns(&self) -> Option<u32> {
        self.channel
            .as_ref()
            .and_then(PwmHandle::programmed)
            .map(|(duty, _)| duty)
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    // ── Internal ──────────────────────────────────────────────

    /// Clamp, map, configure, enable, commit.
    fn apply(&mut self, angle: i32) -> Result<(), ControlError> {
        let timing = self.config.timing;
        let channel = self.channel.as_mut().ok_or(ControlError::NotReady)?;

        let angle = timing.clamp(angle);
        let duty_ns = timing.duty_ns(angle);
        info!("Setting servo: angle={}\u{00b0}, duty_cycle={}ns", angle, duty_ns);

        let previous = channel.programmed();
        if let Err(e) = channel.configure(duty_ns, timing.period_ns) {
            error!("Failed to configure PWM: {}", e);
            return Err(ControlError::ConfigFailed(e));
        }

        if let Err(e) = channel.enable() {
            error!("Failed to enable PWM: {}", e);
            // Put back the duty that matches the committed angle.
            if let Some((duty, period)) = previous {
                if let Err(restore) = channel.configure(duty, period) {
                    warn!("Could not restore previous duty {}ns: {}", duty, restore);
                }
            }
            return Err(ControlError::EnableFailed(e));
        }

        self.angle = angle;
        info!("Servo successfully set to {} degrees", angle);
        Ok(())
    }

    fn push_undo(&mut self, step: UndoStep) {
        if self.undo.push(step).is_err() {
            debug_assert!(false, "undo stack overflow: {step:?}");
        }
    }

    /// Run every pending undo step, newest first, and end in `Released`.
    fn unwind(&mut self) {
        while let Some(step) = self.undo.pop() {
            match step {
                UndoStep::UnregisterNode => {
                    if let Some(node) = self.node.take() {
                        self.registry.unregister(node);
                    }
                }
                UndoStep::ReleaseChannel => {
                    if let Some(mut channel) = self.channel.take() {
                        if channel.is_enabled() {
                            if let Err(e) = channel.disable() {
                                warn!("PWM disable failed during unwind: {}", e);
                            }
                        }
                        channel.release();
                    }
                }
            }
        }
        self.state = ControllerState::Released;
    }
}

impl<P: PwmProvider, R: NodeRegistry> Drop for ServoController<P, R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
