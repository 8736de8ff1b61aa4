//! Integration tests for the command boundary: dispatch, errno mapping,
//! framed requests, and the console loop.

use std::io::Cursor;

use sg90::app::commands::{SERVO_GET_ANGLE, SERVO_SET_ANGLE};
use sg90::control::angle::ServoTiming;
use sg90::rpc::codec::{self, FrameDecoder, Response, MAX_WIRE_SIZE};
use sg90::rpc::{dispatch, dispatch_raw, handle_frame, run_console, serve};
use sg90::{
    CommandError, CommandReply, ControlError, Error, ServoCommand, ServoConfig, EFAULT, EINVAL, EIO, ENODEV,
    ENOTTY, ERANGE,
};

use crate::mock_hw::{Bench, HwCall};

fn errno_of(result: sg90::Result<CommandReply>) -> Option<i32> {
    result.err().map(|e| e.errno())
}

// ── dispatch ──────────────────────────────────────────────────

#[test]
fn out_of_range_never_reaches_hardware() {
    let bench = Bench::new();
    let mut servo = bench.ready();

    for angle in [-1, 181, i32::MIN, i32::MAX] {
        assert_eq!(
            dispatch(&mut servo, ServoCommand::SetAngle(angle)),
            Err(Error::Command(CommandError::AngleOutOfRange(angle)))
        );
    }
    assert!(bench.calls().is_empty());
    assert_eq!(servo.get_angle(), Ok(90));
}

#[test]
fn endpoints_are_accepted() {
    let bench = Bench::new();
    let mut servo = bench.ready();

    assert_eq!(dispatch(&mut servo, ServoCommand::SetAngle(0)), Ok(CommandReply::Done));
    assert_eq!(dispatch(&mut servo, ServoCommand::SetAngle(180)), Ok(CommandReply::Done));
    assert_eq!(dispatch(&mut servo, ServoCommand::GetAngle), Ok(CommandReply::Angle(180)));
}

#[test]
fn errno_mapping_follows_failure_kind() {
    let bench = Bench::new();
    let mut servo = bench.ready();

    assert_eq!(errno_of(dispatch(&mut servo, ServoCommand::SetAngle(200))), Some(ERANGE));

    bench.faults().reject_configure = true;
    assert_eq!(errno_of(dispatch(&mut servo, ServoCommand::SetAngle(10))), Some(EINVAL));

    bench.faults().reject_configure = false;
    bench.faults().reject_enable = true;
    assert_eq!(errno_of(dispatch(&mut servo, ServoCommand::SetAngle(10))), Some(EIO));

    servo.shutdown();
    assert_eq!(errno_of(dispatch(&mut servo, ServoCommand::GetAngle)), Some(ENODEV));
}

#[test]
fn raw_requests_use_ioctl_codes() {
    let bench = Bench::new();
    let mut servo = bench.ready();

    assert_eq!(dispatch_raw(&mut servo, SERVO_SET_ANGLE, 150), Ok(CommandReply::Done));
    assert_eq!(dispatch_raw(&mut servo, SERVO_GET_ANGLE, 0), Ok(CommandReply::Angle(150)));
    assert_eq!(
        dispatch_raw(&mut servo, 0x1234, 0),
        Err(Error::Command(CommandError::UnknownCommand(0x1234)))
    );
    assert_eq!(errno_of(dispatch_raw(&mut servo, 0x1234, 0)), Some(ENOTTY));
}

#[test]
fn not_ready_passes_through_dispatch() {
    let bench = Bench::new();
    let mut servo = bench.controller();
    assert_eq!(
        dispatch(&mut servo, ServoCommand::SetAngle(10)),
        Err(Error::Control(ControlError::NotReady))
    );
}

// ── framed requests ───────────────────────────────────────────

fn request_frame(cmd: ServoCommand) -> Vec<u8> {
    let mut buf = [0u8; MAX_WIRE_SIZE];
    let n = codec::encode_frame(&cmd, &mut buf).unwrap();
    buf[..n].to_vec()
}

fn responses(mut wire: &[u8]) -> Vec<Response> {
    let mut decoder = FrameDecoder::new();
    let mut out = Vec::new();
    while !wire.is_empty() {
        let (used, frame) = decoder.feed(wire);
        if let Some(payload) = frame {
            out.push(codec::decode_payload(payload).unwrap());
        }
        wire = &wire[used..];
    }
    out
}

#[test]
fn handle_frame_round_trip() {
    let bench = Bench::new();
    let mut servo = bench.ready();
    let request = request_frame(ServoCommand::SetAngle(60));
    let mut out = [0u8; MAX_WIRE_SIZE];

    let n = handle_frame(&mut servo, &request[codec::HEADER_SIZE..], &mut out).unwrap();

    assert_eq!(responses(&out[..n]), vec![Ok(CommandReply::Done)]);
    assert_eq!(servo.get_angle(), Ok(60));
}

#[test]
fn garbage_payload_is_efault() {
    let bench = Bench::new();
    let mut servo = bench.ready();
    let mut out = [0u8; MAX_WIRE_SIZE];

    let n = handle_frame(&mut servo, &[0xff, 0xff], &mut out).unwrap();

    assert_eq!(responses(&out[..n]), vec![Err(EFAULT)]);
    assert!(bench.calls().is_empty());
}

#[test]
fn serve_answers_every_frame_in_order() {
    let bench = Bench::new();
    let mut servo = bench.ready();
    let mut input = Vec::new();
    for cmd in [
        ServoCommand::SetAngle(10),
        ServoCommand::GetAngle,
        ServoCommand::SetAngle(999),
        ServoCommand::GetAngle,
    ] {
        input.extend(request_frame(cmd));
    }
    let mut output = Vec::new();

    let handled = serve(&mut servo, Cursor::new(input), &mut output).unwrap();

    assert_eq!(handled, 4);
    assert_eq!(
        responses(&output),
        vec![
            Ok(CommandReply::Done),
            Ok(CommandReply::Angle(10)),
            Err(ERANGE),
            Ok(CommandReply::Angle(10)),
        ]
    );
}

// ── console ───────────────────────────────────────────────────

fn console(bench: &Bench, script: &str) -> String {
    let mut servo = bench.ready();
    let mut output = Vec::new();
    run_console(&mut servo, Cursor::new(script), &mut output).unwrap();
    String::from_utf8(output).unwrap()
}

#[test]
fn console_moves_queries_and_quits() {
    let bench = Bench::new();
    let out = console(&bench, "45\nget\nq\n180\n");

    assert!(out.starts_with("Servo Control Program\n"));
    assert!(out.contains("Servo moved to 45 degrees\n"));
    assert!(out.contains("Servo at 45 degrees\n"));
    assert!(!out.contains("Servo moved to 180"));
    assert!(out.ends_with("Goodbye!\n"));
}

#[test]
fn console_rejects_bad_input_and_keeps_going() {
    let bench = Bench::new();
    let out = console(&bench, "200\nabc\n-5\n30\n");

    assert_eq!(out.matches("Please enter angle between 0 and 180").count(), 3);
    assert!(out.contains("Servo moved to 30 degrees"));
    assert_eq!(bench.last_duty(), Some(833_333));
    assert!(out.ends_with("Goodbye!\n"));
}

#[test]
fn console_hint_follows_configured_travel() {
    let bench = Bench::new();
    let config = ServoConfig {
        timing: ServoTiming {
            min_angle: -90,
            max_angle: 90,
            ..ServoTiming::default()
        },
        default_angle: 0,
        ..ServoConfig::default()
    };
    let mut servo = bench.controller_with(config);
    servo.initialize().unwrap();
    let mut output = Vec::new();

    run_console(&mut servo, Cursor::new("-45\n120\n"), &mut output).unwrap();

    let out = String::from_utf8(output).unwrap();
    assert!(out.contains("Enter angle (-90-90)"));
    assert!(out.contains("Servo moved to -45 degrees\n"));
    assert_eq!(out.matches("Please enter angle between -90 and 90").count(), 1);
    assert!(!out.contains("0 and 180"));
}

#[test]
fn console_stops_on_controller_error() {
    let bench = Bench::new();
    let mut servo = bench.ready();
    bench.faults().reject_enable = true;
    let mut output = Vec::new();

    run_console(&mut servo, Cursor::new("10\n20\n"), &mut output).unwrap();

    let out = String::from_utf8(output).unwrap();
    assert!(out.contains("Command failed"));
    assert!(!out.contains("Servo moved"));
    assert_eq!(bench.count(&HwCall::Enable), 1);
    assert!(out.ends_with("Goodbye!\n"));
}
