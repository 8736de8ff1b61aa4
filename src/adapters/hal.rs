//! `embedded-hal` PWM adapter.
//!
//! Wraps any [`SetDutyCycle`] output whose timer already runs at the servo
//! frame rate.  The bank owns a fixed set of named outputs; requesting one
//! moves it out of the bank and releasing the channel moves it back, fully
//! off.  The period is fixed by the timer, so a configure with a different
//! period is rejected rather than silently rescaled.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::pwm::{Error as _, SetDutyCycle};
use log::{debug, info, warn};

use crate::app::ports::{PwmChannel, PwmProvider};
use crate::error::HardwareError;

struct Slot<P> {
    name: String,
    output: Option<P>,
}

pub struct HalPwmBank<P> {
    slots: Rc<RefCell<Vec<Slot<P>>>>,
    period_ns: u32,
}

impl<P: SetDutyCycle> HalPwmBank<P> {
    /// `period_ns` is the frame the outputs' timer was set up for.
    pub fn new(period_ns: u32) -> Self {
        Self {
            slots: Rc::default(),
            period_ns,
        }
    }

    /// Add a named output; index requests hand them out in insertion order.
    pub fn with_output(self, name: &str, output: P) -> Self {
        self.slots.borrow_mut().push(Slot {
            name: name.to_owned(),
            output: Some(output),
        });
        self
    }
}

impl<P: SetDutyCycle> PwmProvider for HalPwmBank<P> {
    type Channel = HalPwmChannel<P>;

    fn request(&mut self, name: Option<&str>) -> Result<HalPwmChannel<P>, HardwareError> {
        let mut slots = self.slots.borrow_mut();
        let index = match name {
            Some(wanted) => slots.iter().position(|s| s.name == wanted),
            None => slots.iter().position(|s| s.output.is_some()),
        }
        .ok_or(HardwareError::ChannelUnavailable)?;

        let slot = &mut slots[index];
        let output = slot.output.take().ok_or(HardwareError::ChannelUnavailable)?;
        info!("hal: claimed PWM output {}", slot.name);

        Ok(HalPwmChannel {
            output,
            index,
            slots: Rc::clone(&self.slots),
            period_ns: self.period_ns,
            duty: 0,
            enabled: false,
        })
    }
}

pub struct HalPwmChannel<P> {
    output: P,
    index: usize,
    slots: Rc<RefCell<Vec<Slot<P>>>>,
    period_ns: u32,
    /// Raw compare value for the programmed duty.
    duty: u16,
    enabled: bool,
}

impl<P: SetDutyCycle> HalPwmChannel<P> {
    fn write(&mut self, duty: u16) -> Result<(), embedded_hal::pwm::ErrorKind> {
        self.output.set_duty_cycle(duty).map_err(|e| e.kind())
    }
}

impl<P: SetDutyCycle> PwmChannel for HalPwmChannel<P> {
    fn configure(&mut self, duty_ns: u32, period_ns: u32) -> Result<(), HardwareError> {
        if period_ns != self.period_ns || duty_ns > period_ns {
            debug!("hal: refusing {}ns/{}ns on a {}ns timer", duty_ns, period_ns, self.period_ns);
            return Err(HardwareError::ConfigurationRejected);
        }
        let max = u64::from(self.output.max_duty_cycle());
        let raw = u64::from(duty_ns) * max / u64::from(period_ns);
        let duty = u16::try_from(raw).map_err(|_| HardwareError::ConfigurationRejected)?;

        if self.enabled {
            self.write(duty).map_err(|kind| {
                warn!("hal: set duty {} failed: {:?}", duty, kind);
                HardwareError::ConfigurationRejected
            })?;
        }
        self.duty = duty;
        Ok(())
    }

    fn enable(&mut self) -> Result<(), HardwareError> {
        self.write(self.duty).map_err(|kind| {
            warn!("hal: enable failed: {:?}", kind);
            HardwareError::EnableRejected
        })?;
        self.enabled = true;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), HardwareError> {
        self.output.set_duty_cycle_fully_off().map_err(|e| {
            warn!("hal: disable failed: {:?}", e.kind());
            HardwareError::EnableRejected
        })?;
        self.enabled = false;
        Ok(())
    }

    fn release(mut self) {
        if let Err(e) = self.output.set_duty_cycle_fully_off() {
            warn!("hal: output left driving on release: {:?}", e.kind());
        }
        let mut slots = self.slots.borrow_mut();
        let slot = &mut slots[self.index];
        info!("hal: released PWM output {}", slot.name);
        slot.output = Some(self.output);
    }
}
