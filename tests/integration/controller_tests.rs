//! Integration tests for [`ServoController`] lifecycle and commands.
//!
//! Uses the recording mocks from `mock_hw` so every test can assert on the
//! exact sequence of platform calls.

use sg90::config::ServoConfig;
use sg90::drivers::pwm::ChannelSource;
use sg90::{ControlError, ControllerState, HardwareError, InitError, RegistrationError};

use crate::mock_hw::{Bench, Faults, HwCall};

const PERIOD: u32 = 20_000_000;

fn configure(duty_ns: u32) -> HwCall {
    HwCall::Configure {
        duty_ns,
        period_ns: PERIOD,
    }
}

fn request(name: &str) -> HwCall {
    HwCall::Request(Some(name.to_owned()))
}

// ── initialize ────────────────────────────────────────────────

#[test]
fn initialize_acquires_registers_and_centres() {
    let bench = Bench::new();
    let mut servo = bench.controller();

    servo.initialize().unwrap();

    assert_eq!(servo.state(), ControllerState::Ready);
    assert_eq!(servo.get_angle(), Ok(90));
    assert_eq!(
        bench.calls(),
        vec![
            request("pwmchip2"),
            HwCall::Register("sg90".into()),
            configure(1_500_000),
            HwCall::Enable,
        ]
    );
}

#[test]
fn candidates_are_tried_in_order_then_index() {
    let bench = Bench::with_faults(Faults {
        named: vec![],
        ..Faults::default()
    });
    let mut servo = bench.controller();

    servo.initialize().unwrap();

    assert_eq!(
        bench.calls()[..4],
        [
            request("pwmchip2"),
            request("2030000.pwm"),
            request("sg90"),
            HwCall::Request(None),
        ]
    );
    assert_eq!(servo.channel_source(), Some(&ChannelSource::Index));
}

#[test]
fn later_candidate_wins_without_index_request() {
    let bench = Bench::with_faults(Faults {
        named: vec!["2030000.pwm"],
        ..Faults::default()
    });
    let mut servo = bench.controller();

    servo.initialize().unwrap();

    assert_eq!(bench.count(&HwCall::Request(None)), 0);
    assert!(matches!(
        servo.channel_source(),
        Some(ChannelSource::Named(name)) if name.as_str() == "2030000.pwm"
    ));
}

#[test]
fn no_channel_fails_without_touching_registry() {
    let bench = Bench::with_faults(Faults {
        named: vec![],
        index_available: false,
        ..Faults::default()
    });
    let mut servo = bench.controller();

    assert_eq!(servo.initialize(), Err(InitError::NoChannel));
    assert_eq!(servo.state(), ControllerState::Released);
    assert_eq!(bench.position(&HwCall::Register("sg90".into())), None);
    assert_eq!(bench.count(&HwCall::Release), 0);
}

#[test]
fn registration_failure_releases_channel_exactly_once() {
    let bench = Bench::with_faults(Faults {
        register_error: Some(RegistrationError::NameInUse),
        ..Faults::default()
    });
    let mut servo = bench.controller();

    assert_eq!(
        servo.initialize(),
        Err(InitError::RegistrationFailed(RegistrationError::NameInUse))
    );
    assert_eq!(servo.state(), ControllerState::Released);

    servo.shutdown();
    drop(servo);
    assert_eq!(bench.count(&HwCall::Release), 1);
    assert_eq!(bench.last_duty(), None);
    assert_eq!(bench.count(&HwCall::Unregister("sg90".into())), 0);
}

#[test]
fn default_apply_failure_unwinds_in_reverse_order() {
    let bench = Bench::with_faults(Faults {
        reject_configure: true,
        ..Faults::default()
    });
    let mut servo = bench.controller();

    assert_eq!(
        servo.initialize(),
        Err(InitError::DefaultApplyFailed(ControlError::ConfigFailed(
            HardwareError::ConfigurationRejected
        )))
    );

    let unregister = bench.position(&HwCall::Unregister("sg90".into())).unwrap();
    let release = bench.position(&HwCall::Release).unwrap();
    assert!(unregister < release);
    assert_eq!(bench.count(&HwCall::Release), 1);
    assert_eq!(servo.state(), ControllerState::Released);
}

#[test]
fn default_enable_failure_is_reported() {
    let bench = Bench::with_faults(Faults {
        reject_enable: true,
        ..Faults::default()
    });
    let mut servo = bench.controller();

    assert_eq!(
        servo.initialize(),
        Err(InitError::DefaultApplyFailed(ControlError::EnableFailed(
            HardwareError::EnableRejected
        )))
    );
    assert_eq!(bench.count(&HwCall::Disable), 0);
    assert_eq!(bench.count(&HwCall::Release), 1);
}

#[test]
fn configured_default_angle_is_applied() {
    let bench = Bench::new();
    let config = ServoConfig {
        default_angle: 0,
        ..ServoConfig::default()
    };
    let mut servo = bench.controller_with(config);

    servo.initialize().unwrap();
    assert_eq!(servo.get_angle(), Ok(0));
    assert_eq!(bench.last_duty(), Some(500_000));
}

// ── set_angle / get_angle ─────────────────────────────────────

#[test]
fn endpoints_map_to_pulse_limits() {
    let bench = Bench::new();
    let mut servo = bench.ready();

    servo.set_angle(0).unwrap();
    assert_eq!(bench.last_duty(), Some(500_000));
    servo.set_angle(180).unwrap();
    assert_eq!(bench.last_duty(), Some(2_500_000));
    servo.set_angle(90).unwrap();
    assert_eq!(bench.last_duty(), Some(1_500_000));
}

#[test]
fn out_of_range_is_clamped_in_the_core() {
    let bench = Bench::new();
    let mut servo = bench.ready();

    servo.set_angle(270).unwrap();
    assert_eq!(servo.get_angle(), Ok(180));
    assert_eq!(bench.last_duty(), Some(2_500_000));

    servo.set_angle(-30).unwrap();
    assert_eq!(servo.get_angle(), Ok(0));
    assert_eq!(bench.last_duty(), Some(500_000));
}

#[test]
fn configure_failure_keeps_committed_angle() {
    let bench = Bench::new();
    let mut servo = bench.ready();
    servo.set_angle(45).unwrap();

    bench.faults().reject_configure = true;
    assert_eq!(
        servo.set_angle(120),
        Err(ControlError::ConfigFailed(HardwareError::ConfigurationRejected))
    );
    assert_eq!(servo.get_angle(), Ok(45));
    assert_eq!(bench.count(&HwCall::Enable), 1);
}

#[test]
fn enable_failure_restores_previous_duty() {
    let bench = Bench::new();
    let mut servo = bench.ready();

    bench.faults().reject_enable = true;
    assert_eq!(
        servo.set_angle(0),
        Err(ControlError::EnableFailed(HardwareError::EnableRejected))
    );
    assert_eq!(servo.get_angle(), Ok(90));
    assert_eq!(
        bench.calls(),
        vec![configure(500_000), HwCall::Enable, configure(1_500_000)]
    );
    assert_eq!(servo.duty_ns(), Some(1_500_000));
}

#[test]
fn repeated_set_is_idempotent() {
    let bench = Bench::new();
    let mut servo = bench.ready();

    servo.set_angle(33).unwrap();
    let first = bench.last_duty();
    servo.set_angle(33).unwrap();

    assert_eq!(bench.last_duty(), first);
    assert_eq!(servo.get_angle(), Ok(33));
    assert_eq!(servo.state(), ControllerState::Ready);
}

#[test]
fn commands_before_initialize_are_not_ready() {
    let bench = Bench::new();
    let mut servo = bench.controller();

    assert_eq!(servo.set_angle(10), Err(ControlError::NotReady));
    assert_eq!(servo.get_angle(), Err(ControlError::NotReady));
    assert!(bench.calls().is_empty());
}

// ── shutdown ──────────────────────────────────────────────────

#[test]
fn shutdown_disables_releases_then_unregisters() {
    let bench = Bench::new();
    let mut servo = bench.ready();

    servo.shutdown();

    assert_eq!(servo.state(), ControllerState::Released);
    assert_eq!(
        bench.calls(),
        vec![
            HwCall::Disable,
            HwCall::Release,
            HwCall::Unregister("sg90".into()),
        ]
    );
}

#[test]
fn second_shutdown_is_a_no_op() {
    let bench = Bench::new();
    let mut servo = bench.ready();

    servo.shutdown();
    let after_first = bench.calls();
    servo.shutdown();

    assert_eq!(bench.calls(), after_first);
    assert_eq!(servo.state(), ControllerState::Released);
}

#[test]
fn commands_after_shutdown_are_not_ready() {
    let bench = Bench::new();
    let mut servo = bench.ready();
    servo.shutdown();
    bench.clear();

    assert_eq!(servo.set_angle(10), Err(ControlError::NotReady));
    assert_eq!(servo.get_angle(), Err(ControlError::NotReady));
    assert!(bench.calls().is_empty());
}

#[test]
fn disable_failure_does_not_block_release() {
    let bench = Bench::new();
    let mut servo = bench.ready();
    bench.faults().reject_disable = true;

    servo.shutdown();

    assert_eq!(bench.count(&HwCall::Release), 1);
    assert_eq!(bench.count(&HwCall::Unregister("sg90".into())), 1);
    assert_eq!(servo.state(), ControllerState::Released);
}

#[test]
fn dropping_a_ready_controller_shuts_it_down() {
    let bench = Bench::new();
    let servo = bench.ready();

    drop(servo);

    assert_eq!(
        bench.calls(),
        vec![
            HwCall::Disable,
            HwCall::Release,
            HwCall::Unregister("sg90".into()),
        ]
    );
}
