//! In-memory PWM and node-registry backends.
//!
//! Used by `sg90ctl --sim` and by tests on hosts without PWM hardware.
//! Channels track duty, period and enable state; claims are exclusive,
//! so a second request for a held channel is refused just as the real
//! platform would refuse it.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use log::{debug, info};

use crate::adapters::utils::is_valid_node_name;
use crate::app::ports::{NodeRegistry, PwmChannel, PwmProvider};
use crate::error::{HardwareError, RegistrationError};

// ── PWM ───────────────────────────────────────────────────────

/// Simulated PWM controller exposing a fixed set of named channels.
pub struct SimPwm {
    /// Channel names in index order.
    channels: Vec<String>,
    claimed: Rc<RefCell<BTreeSet<String>>>,
}

impl SimPwm {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            channels: names.into_iter().map(str::to_owned).collect(),
            claimed: Rc::default(),
        }
    }

    pub fn is_claimed(&self, name: &str) -> bool {
        self.claimed.borrow().contains(name)
    }
}

impl PwmProvider for SimPwm {
    type Channel = SimChannel;

    fn request(&mut self, name: Option<&str>) -> Result<SimChannel, HardwareError> {
        let found = match name {
            Some(wanted) => self.channels.iter().find(|c| c.as_str() == wanted),
            None => self.channels.first(),
        };
        let name = found.ok_or(HardwareError::ChannelUnavailable)?.clone();

        if !self.claimed.borrow_mut().insert(name.clone()) {
            debug!("sim: PWM channel {} busy", name);
            return Err(HardwareError::ChannelUnavailable);
        }
        info!("sim: claimed PWM channel {}", name);

        Ok(SimChannel {
            name,
            claimed: Rc::clone(&self.claimed),
            duty_ns: 0,
            period_ns: 0,
            enabled: false,
        })
    }
}

/// One claimed simulated channel.
#[derive(Debug)]
pub struct SimChannel {
    name: String,
    claimed: Rc<RefCell<BTreeSet<String>>>,
    duty_ns: u32,
    period_ns: u32,
    enabled: bool,
}

impl SimChannel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duty_ns(&self) -> u32 {
        self.duty_ns
    }

    pub fn period_ns(&self) -> u32 {
        self.period_ns
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl PwmChannel for SimChannel {
    fn configure(&mut self, duty_ns: u32, period_ns: u32) -> Result<(), HardwareError> {
        if period_ns == 0 || duty_ns > period_ns {
            return Err(HardwareError::ConfigurationRejected);
        }
        self.duty_ns = duty_ns;
        self.period_ns = period_ns;
        debug!("sim: {} duty={}ns period={}ns", self.name, duty_ns, period_ns);
        Ok(())
    }

    fn enable(&mut self) -> Result<(), HardwareError> {
        self.enabled = true;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), HardwareError> {
        self.enabled = false;
        Ok(())
    }

    fn release(self) {
        self.claimed.borrow_mut().remove(&self.name);
        info!("sim: released PWM channel {}", self.name);
    }
}

// ── Node registry ─────────────────────────────────────────────

/// Simulated node registry: names are unique while registered.
#[derive(Debug, Default)]
pub struct SimRegistry {
    names: BTreeSet<String>,
}

/// Handle for a node held in a [`SimRegistry`].
#[derive(Debug, PartialEq, Eq)]
pub struct SimNode(String);

impl SimRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl NodeRegistry for SimRegistry {
    type Node = SimNode;

    fn register(&mut self, name: &str) -> Result<SimNode, RegistrationError> {
        if !is_valid_node_name(name) {
            return Err(RegistrationError::InvalidName);
        }
        if !self.names.insert(name.to_owned()) {
            return Err(RegistrationError::NameInUse);
        }
        info!("sim: registered node /dev/{}", name);
        Ok(SimNode(name.to_owned()))
    }

    fn unregister(&mut self, node: SimNode) {
        self.names.remove(&node.0);
        info!("sim: unregistered node /dev/{}", node.0);
    }
}
