//! Interactive console and framed request loop.
//!
//! Both run against any reader/writer pair so `sg90ctl` can bind them to
//! stdin/stdout and tests can bind them to byte buffers.

use std::io::{self, BufRead, ErrorKind, Read, Write};

use log::{error, info, warn};

use crate::app::commands::{CommandReply, ServoCommand};
use crate::app::controller::ServoController;
use crate::app::ports::{NodeRegistry, PwmProvider};
use crate::error::{CommandError, Error};

use super::codec::{FrameDecoder, MAX_WIRE_SIZE};
use super::dispatch::{dispatch, handle_frame};
use super::text::{parse_line, ConsoleInput};

/// Read commands line by line until `q`, end of input, or a controller error.
///
/// Rejected input prints a hint and the loop continues.  A failure inside
/// the controller is reported and ends the session.
pub fn run_console<P, R>(
    servo: &mut ServoController<P, R>,
    mut input: impl BufRead,
    mut output: impl Write,
) -> io::Result<()>
where
    P: PwmProvider,
    R: NodeRegistry,
{
    let timing = servo.config().timing;
    let range_hint = format!(
        "Please enter angle between {} and {}",
        timing.min_angle, timing.max_angle
    );

    writeln!(output, "Servo Control Program")?;
    writeln!(
        output,
        "Enter angle ({}-{}), 'get' to query, or 'q' to quit:",
        timing.min_angle, timing.max_angle
    )?;

    let mut line = String::new();
    loop {
        write!(output, "> ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let cmd = match parse_line(&line) {
            Ok(ConsoleInput::Quit) => break,
            Ok(ConsoleInput::Command(cmd)) => cmd,
            Err(_) => {
                writeln!(output, "{range_hint}")?;
                continue;
            }
        };

        match (cmd, dispatch(servo, cmd)) {
            (ServoCommand::SetAngle(angle), Ok(_)) => {
                writeln!(output, "Servo moved to {angle} degrees")?;
            }
            (_, Ok(CommandReply::Angle(angle))) => writeln!(output, "Servo at {angle} degrees")?,
            (_, Ok(CommandReply::Done)) => {}
            (_, Err(Error::Command(CommandError::AngleOutOfRange(_)))) => {
                writeln!(output, "{range_hint}")?;
            }
            (_, Err(e)) => {
                error!("Command {:?} failed: {}", cmd, e);
                writeln!(output, "Command failed: {e}")?;
                break;
            }
        }
    }

    writeln!(output, "Goodbye!")?;
    Ok(())
}

/// Answer framed requests from `input` until end of input.
///
/// Returns the number of requests handled.
pub fn serve<P, R>(
    servo: &mut ServoController<P, R>,
    mut input: impl Read,
    mut output: impl Write,
) -> io::Result<usize>
where
    P: PwmProvider,
    R: NodeRegistry,
{
    let mut decoder = FrameDecoder::new();
    let mut rx = [0u8; 256];
    let mut tx = [0u8; MAX_WIRE_SIZE];
    let mut handled = 0;

    loop {
        let n = match input.read(&mut rx) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        let mut chunk = &rx[..n];
        while !chunk.is_empty() {
            let (used, frame) = decoder.feed(chunk);
            if let Some(payload) = frame {
                match handle_frame(servo, payload, &mut tx) {
                    Some(len) => output.write_all(&tx[..len])?,
                    None => warn!("Response did not fit a frame"),
                }
                handled += 1;
            }
            chunk = &chunk[used..];
        }
        output.flush()?;
    }

    info!("Input closed after {} requests", handled);
    Ok(handled)
}
