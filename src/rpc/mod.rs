//! Command interface in front of the servo controller.
//!
//! ```text
//!  console line ──▶ text::parse_line ─┐
//!                                     ├──▶ dispatch ──▶ ServoController
//!  framed bytes ──▶ codec ────────────┘        │
//!                     ▲                        │
//!                     └──── Response frame ◀───┘
//! ```
//!
//! [`session`] wraps both paths in I/O loops over any reader and writer.

pub mod codec;
pub mod dispatch;
pub mod session;
pub mod text;

pub use dispatch::{dispatch, dispatch_raw, handle_frame};
pub use session::{run_console, serve};
