//! PWM channel handle with acquire-by-name-with-fallback.
//!
//! [`acquire`] walks an ordered list of channel names, then makes one
//! index-based request.  The resulting [`PwmHandle`] wraps the platform
//! channel and tracks what was last programmed so the controller can
//! report and restore it.
//!
//! ## Safety contract
//!
//! The handle never forwards a duty longer than the period, and a zero
//! period never reaches the platform.  Both are refused here with
//! [`HardwareError::ConfigurationRejected`].

use log::{debug, info, warn};

use crate::app::ports::{PwmChannel, PwmProvider};
use crate::config::Name;
use crate::error::HardwareError;

/// How a channel was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSource {
    /// Accepted under this candidate name.
    Named(Name),
    /// Obtained through the index fallback.
    Index,
}

impl core::fmt::Display for ChannelSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Index => write!(f, "<index 0>"),
        }
    }
}

/// Claim the first channel the platform accepts.
///
/// Tries every name in `candidates` in order, then one unnamed request.
/// Fails with [`HardwareError::ChannelUnavailable`] only when every attempt
/// fails.
pub fn acquire<'a, P, I>(provider: &mut P, candidates: I) -> Result<PwmHandle<P::Channel>, HardwareError>
where
    P: PwmProvider,
    I: IntoIterator<Item = &'a str>,
{
    for name in candidates {
        match provider.request(Some(name)) {
            Ok(channel) => {
                info!("Found PWM device: {}", name);
                let mut label = Name::new();
                // Names longer than the label capacity are still usable; only the label is cut.
                for ch in name.chars() {
                    if label.push(ch).is_err() {
                        break;
                    }
                }
                return Ok(PwmHandle::new(channel, ChannelSource::Named(label)));
            }
            Err(e) => info!("PWM device {} not available: {}", name, e),
        }
    }

    match provider.request(None) {
        Ok(channel) => {
            info!("Got PWM device by index");
            Ok(PwmHandle::new(channel, ChannelSource::Index))
        }
        Err(e) => {
            warn!("PWM index fallback failed: {}", e);
            Err(HardwareError::ChannelUnavailable)
        }
    }
}

/// Exclusive handle on one acquired PWM channel.
pub struct PwmHandle<C: PwmChannel> {
    channel: C,
    source: ChannelSource,
    /// Last `(duty_ns, period_ns)` the platform accepted.
    programmed: Option<(u32, u32)>,
    enabled: bool,
}

impl<C: PwmChannel> PwmHandle<C> {
    fn new(channel: C, source: ChannelSource) -> Self {
        Self {
            channel,
            source,
            programmed: None,
            enabled: false,
        }
    }

    pub fn configure(&mut self, duty_ns: u32, period_ns: u32) -> Result<(), HardwareError> {
        if period_ns == 0 || duty_ns > period_ns {
            warn!("Refusing PWM timing duty={}ns period={}ns", duty_ns, period_ns);
            return Err(HardwareError::ConfigurationRejected);
        }
        self.channel.configure(duty_ns, period_ns)?;
        self.programmed = Some((duty_ns, period_ns));
        Ok(())
    }

    pub fn enable(&mut self) -> Result<(), HardwareError> {
        self.channel.enable()?;
        self.enabled = true;
        Ok(())
    }

    pub fn disable(&mut self) -> Result<(), HardwareError> {
        self.channel.disable()?;
        self.enabled = false;
        Ok(())
    }

    /// Hand the channel back.  Consumes the handle.
    pub fn release(self) {
        debug!("Releasing PWM device {}", self.source);
        self.channel.release();
    }

    pub fn source(&self) -> &ChannelSource {
        &self.source
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Last accepted `(duty_ns, period_ns)`, if any.
    pub fn programmed(&self) -> Option<(u32, u32)> {
        self.programmed
    }
}
