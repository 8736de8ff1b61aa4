//! Mock PWM and node-registry adapters for integration tests.
//!
//! Every port call lands in one shared, ordered log so tests can assert
//! on the exact sequence the controller drives, including rollback order.
//! Faults are injected through [`Faults`], which tests may flip mid-run.

use std::cell::RefCell;
use std::rc::Rc;

use sg90::app::ports::{NodeRegistry, PwmChannel, PwmProvider};
use sg90::config::ServoConfig;
use sg90::{HardwareError, RegistrationError, ServoController};

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    Request(Option<String>),
    Configure { duty_ns: u32, period_ns: u32 },
    Enable,
    Disable,
    Release,
    Register(String),
    Unregister(String),
}

/// Knobs for the mock platform.
pub struct Faults {
    /// Channel names the platform accepts.
    pub named: Vec<&'static str>,
    pub index_available: bool,
    pub reject_configure: bool,
    pub reject_enable: bool,
    pub reject_disable: bool,
    pub register_error: Option<RegistrationError>,
}

impl Default for Faults {
    fn default() -> Self {
        Self {
            named: vec!["pwmchip2"],
            index_available: true,
            reject_configure: false,
            reject_enable: false,
            reject_disable: false,
            register_error: None,
        }
    }
}

// ── Bench ─────────────────────────────────────────────────────

/// Shared state behind a [`MockPwm`] / [`MockRegistry`] pair.
#[derive(Clone, Default)]
pub struct Bench {
    log: Rc<RefCell<Vec<HwCall>>>,
    faults: Rc<RefCell<Faults>>,
}

#[allow(dead_code)]
impl Bench {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_faults(faults: Faults) -> Self {
        Self {
            log: Rc::default(),
            faults: Rc::new(RefCell::new(faults)),
        }
    }

    pub fn faults(&self) -> std::cell::RefMut<'_, Faults> {
        self.faults.borrow_mut()
    }

    pub fn calls(&self) -> Vec<HwCall> {
        self.log.borrow().clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn count(&self, call: &HwCall) -> usize {
        self.log.borrow().iter().filter(|c| *c == call).count()
    }

    pub fn position(&self, call: &HwCall) -> Option<usize> {
        self.log.borrow().iter().position(|c| c == call)
    }

    /// Duty of the most recent configure call.
    pub fn last_duty(&self) -> Option<u32> {
        self.log.borrow().iter().rev().find_map(|c| match c {
            HwCall::Configure { duty_ns, .. } => Some(*duty_ns),
            _ => None,
        })
    }

    pub fn controller(&self) -> ServoController<MockPwm, MockRegistry> {
        self.controller_with(ServoConfig::default())
    }

    pub fn controller_with(&self, config: ServoConfig) -> ServoController<MockPwm, MockRegistry> {
        let pwm = MockPwm { bench: self.clone() };
        let registry = MockRegistry { bench: self.clone() };
        ServoController::new(config, pwm, registry).unwrap()
    }

    /// A controller that has already initialized; the log starts empty.
    pub fn ready(&self) -> ServoController<MockPwm, MockRegistry> {
        let mut servo = self.controller();
        servo.initialize().unwrap();
        self.clear();
        servo
    }

    fn record(&self, call: HwCall) {
        self.log.borrow_mut().push(call);
    }
}

// ── PWM ───────────────────────────────────────────────────────

pub struct MockPwm {
    bench: Bench,
}

impl PwmProvider for MockPwm {
    type Channel = MockChannel;

    fn request(&mut self, name: Option<&str>) -> Result<MockChannel, HardwareError> {
        self.bench.record(HwCall::Request(name.map(str::to_owned)));
        let faults = self.bench.faults.borrow();
        let ok = match name {
            Some(n) => faults.named.iter().any(|accepted| *accepted == n),
            None => faults.index_available,
        };
        if ok {
            Ok(MockChannel {
                bench: self.bench.clone(),
            })
        } else {
            Err(HardwareError::ChannelUnavailable)
        }
    }
}

pub struct MockChannel {
    bench: Bench,
}

impl PwmChannel for MockChannel {
    fn configure(&mut self, duty_ns: u32, period_ns: u32) -> Result<(), HardwareError> {
        self.bench.record(HwCall::Configure { duty_ns, period_ns });
        if self.bench.faults.borrow().reject_configure {
            return Err(HardwareError::ConfigurationRejected);
        }
        Ok(())
    }

    fn enable(&mut self) -> Result<(), HardwareError> {
        self.bench.record(HwCall::Enable);
        if self.bench.faults.borrow().reject_enable {
            return Err(HardwareError::EnableRejected);
        }
        Ok(())
    }

    fn disable(&mut self) -> Result<(), HardwareError> {
        self.bench.record(HwCall::Disable);
        if self.bench.faults.borrow().reject_disable {
            return Err(HardwareError::EnableRejected);
        }
        Ok(())
    }

    fn release(self) {
        self.bench.record(HwCall::Release);
    }
}

// ── Node registry ─────────────────────────────────────────────

pub struct MockRegistry {
    bench: Bench,
}

impl NodeRegistry for MockRegistry {
    type Node = String;

    fn register(&mut self, name: &str) -> Result<String, RegistrationError> {
        self.bench.record(HwCall::Register(name.to_owned()));
        match self.bench.faults.borrow().register_error {
            Some(e) => Err(e),
            None => Ok(name.to_owned()),
        }
    }

    fn unregister(&mut self, node: String) {
        self.bench.record(HwCall::Unregister(node));
    }
}
