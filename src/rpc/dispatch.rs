//! Command dispatch: the validating boundary in front of the controller.
//!
//! The controller clamps whatever angle it is given.  This layer is
//! stricter: a set-angle outside the configured travel is refused with
//! [`CommandError::AngleOutOfRange`] and never reaches the hardware.

use log::{debug, warn};

use crate::app::commands::{CommandReply, ServoCommand};
use crate::app::controller::ServoController;
use crate::app::ports::{NodeRegistry, PwmProvider};
use crate::error::{CommandError, Error, Result};

use super::codec::{self, Response};

/// Validate and apply one command.
pub fn dispatch<P, R>(servo: &mut ServoController<P, R>, cmd: ServoCommand) -> Result<CommandReply>
where
    P: PwmProvider,
    R: NodeRegistry,
{
    debug!("dispatch {:?}", cmd);
    match cmd {
        ServoCommand::SetAngle(angle) => {
            if !servo.config().timing.contains(angle) {
                warn!("Rejecting out-of-range angle {}", angle);
                return Err(CommandError::AngleOutOfRange(angle).into());
            }
            servo.set_angle(angle)?;
            Ok(CommandReply::Done)
        }
        ServoCommand::GetAngle => Ok(CommandReply::Angle(servo.get_angle()?)),
    }
}

/// Dispatch an ioctl-style `(code, arg)` request.
pub fn dispatch_raw<P, R>(servo: &mut ServoController<P, R>, code: u32, arg: i32) -> Result<CommandReply>
where
    P: PwmProvider,
    R: NodeRegistry,
{
    let cmd = ServoCommand::from_raw(code, arg)?;
    dispatch(servo, cmd)
}

/// Decode a request frame payload, dispatch it, and encode the framed
/// [`Response`] into `out_buf`.  Returns the response length.
pub fn handle_frame<P, R>(servo: &mut ServoController<P, R>, payload: &[u8], out_buf: &mut [u8]) -> Option<usize>
where
    P: PwmProvider,
    R: NodeRegistry,
{
    let response: Response = codec::decode_payload(payload)
        .map_err(Error::from)
        .and_then(|cmd| dispatch(servo, cmd))
        .map_err(|e| e.errno());
    codec::encode_frame(&response, out_buf)
}
