//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements     | Connects to                      |
//! |---------------|----------------|----------------------------------|
//! | `sysfs`       | PwmProvider    | Linux `/sys/class/pwm`           |
//! | `hal`         | PwmProvider    | any `embedded-hal` PWM output    |
//! | `sim`         | PwmProvider    | in-memory channels               |
//! |               | NodeRegistry   | in-memory name table             |
//! | `node`        | NodeRegistry   | pid lock files under `/run/lock` |
//! | `config_file` | ConfigPort     | JSON file on disk                |

pub mod config_file;
pub mod hal;
pub(crate) mod lock;
pub mod node;
pub mod sim;
#[cfg(feature = "sysfs")]
pub mod sysfs;
pub(crate) mod utils;
