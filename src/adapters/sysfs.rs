//! Linux sysfs PWM adapter.
//!
//! Drives `/sys/class/pwm/pwmchipN/pwmM/{period,duty_cycle,enable}`.
//!
//! Channel lookup:
//! - a named request matches either the chip directory (`pwmchip2`) or the
//!   basename of the chip's `device` link (`2030000.pwm`);
//! - the index request takes the lowest-numbered chip.
//!
//! Each line is claimed with a pid lock `<lock_dir>/pwmchipN-pwmM.lock`
//! before it is touched, so a second provider in this process or another
//! one gets [`HardwareError::ChannelUnavailable`] while the owner runs.
//! The line is exported on request if it is not already, and unexported on
//! release only when this provider exported it.  The kernel insists on
//! `duty_cycle <= period` after every write, so [`SysfsChannel::configure`]
//! orders the two writes accordingly.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::adapters::lock::{LockError, PidLock};
use crate::app::ports::{PwmChannel, PwmProvider};
use crate::error::HardwareError;

pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/pwm";

const CHIP_PREFIX: &str = "pwmchip";

#[derive(Debug)]
pub struct SysfsPwm {
    root: PathBuf,
    /// Where line claims are recorded.
    lock_dir: PathBuf,
    /// Line number within each chip.
    line: u32,
}

impl SysfsPwm {
    pub fn new(root: impl Into<PathBuf>, lock_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock_dir: lock_dir.into(),
            line: 0,
        }
    }

    /// Use line `line` of the selected chip instead of line 0.
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    /// `pwmchipN` directories, sorted by `N`.
    fn chips(&self) -> io::Result<Vec<PathBuf>> {
        let mut chips: Vec<(u32, PathBuf)> = fs::read_dir(&self.root)?
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let index = entry
                    .file_name()
                    .to_str()?
                    .strip_prefix(CHIP_PREFIX)?
                    .parse()
                    .ok()?;
                Some((index, entry.path()))
            })
            .collect();
        chips.sort_by_key(|(index, _)| *index);
        Ok(chips.into_iter().map(|(_, path)| path).collect())
    }

    fn find_chip(&self, name: Option<&str>) -> Option<PathBuf> {
        let chips = match self.chips() {
            Ok(chips) => chips,
            Err(e) => {
                warn!("Cannot list {}: {}", self.root.display(), e);
                return None;
            }
        };

        let Some(name) = name else {
            return chips.into_iter().next();
        };
        chips.into_iter().find(|chip| {
            chip.file_name().is_some_and(|f| f == name)
                || fs::read_link(chip.join("device"))
                    .ok()
                    .and_then(|target| target.file_name().map(|f| f == name))
                    .unwrap_or(false)
        })
    }
}

impl PwmProvider for SysfsPwm {
    type Channel = SysfsChannel;

    fn request(&mut self, name: Option<&str>) -> Result<SysfsChannel, HardwareError> {
        let chip = self.find_chip(name).ok_or(HardwareError::ChannelUnavailable)?;
        let line = format!("pwm{}", self.line);
        let dir = chip.join(&line);

        let chip_name = chip.file_name().map(|f| f.to_string_lossy()).unwrap_or_default();
        let claim = PidLock::acquire(self.lock_dir.join(format!("{chip_name}-{line}.lock")))
            .map_err(|e| {
                match e {
                    LockError::Held => warn!("{} is owned by another controller", dir.display()),
                    LockError::Io => warn!("Cannot record claim in {}", self.lock_dir.display()),
                }
                HardwareError::ChannelUnavailable
            })?;

        let exported_here = if dir.is_dir() {
            debug!("{} already exported", dir.display());
            false
        } else {
            let exported = fs::write(chip.join("export"), self.line.to_string())
                .map_err(|e| warn!("Cannot export line {} on {}: {}", self.line, chip.display(), e))
                .is_ok();
            if !exported || !dir.is_dir() {
                if exported {
                    warn!("Export did not create {}", dir.display());
                }
                claim.release();
                return Err(HardwareError::ChannelUnavailable);
            }
            true
        };

        info!("Claimed {}", dir.display());
        Ok(SysfsChannel {
            chip,
            dir,
            line: self.line,
            exported_here,
            claim,
        })
    }
}

/// One exported sysfs PWM line.
#[derive(Debug)]
pub struct SysfsChannel {
    chip: PathBuf,
    dir: PathBuf,
    line: u32,
    exported_here: bool,
    claim: PidLock,
}

impl SysfsChannel {
    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn write_attr(&self, attr: &str, value: u32) -> io::Result<()> {
        fs::write(self.dir.join(attr), value.to_string())
    }

    fn read_attr(&self, attr: &str) -> Option<u32> {
        fs::read_to_string(self.dir.join(attr)).ok()?.trim().parse().ok()
    }
}

impl PwmChannel for SysfsChannel {
    fn configure(&mut self, duty_ns: u32, period_ns: u32) -> Result<(), HardwareError> {
        if period_ns == 0 || duty_ns > period_ns {
            return Err(HardwareError::ConfigurationRejected);
        }

        // Widen the period before raising the duty, shrink the duty before
        // narrowing the period.
        let current_duty = self.read_attr("duty_cycle").unwrap_or(0);
        let result = if period_ns >= current_duty {
            self.write_attr("period", period_ns)
                .and_then(|()| self.write_attr("duty_cycle", duty_ns))
        } else {
            self.write_attr("duty_cycle", duty_ns)
                .and_then(|()| self.write_attr("period", period_ns))
        };

        result.map_err(|e| {
            warn!("{}: configure {}ns/{}ns failed: {}", self.dir.display(), duty_ns, period_ns, e);
            HardwareError::ConfigurationRejected
        })
    }

    fn enable(&mut self) -> Result<(), HardwareError> {
        self.write_attr("enable", 1).map_err(|e| {
            warn!("{}: enable failed: {}", self.dir.display(), e);
            HardwareError::EnableRejected
        })
    }

    fn disable(&mut self) -> Result<(), HardwareError> {
        self.write_attr("enable", 0).map_err(|e| {
            warn!("{}: disable failed: {}", self.dir.display(), e);
            HardwareError::EnableRejected
        })
    }

    fn release(self) {
        if self.exported_here {
            if let Err(e) = fs::write(self.chip.join("unexport"), self.line.to_string()) {
                warn!("Cannot unexport {}: {}", self.dir.display(), e);
            }
        }
        info!("Released {}", self.dir.display());
        self.claim.release();
    }
}
