//! End-to-end tests of the command surface against the virtual joystick.

use mjc3::backends::{ReadStep, VirtualJoystick, VirtualTransport};
use mjc3::{
    CommandError, Config, DescriptorPolicy, Dispatcher, OutcomeFilter, ReadFailure, ReadOutcome,
    Response,
};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

fn dispatcher() -> (VirtualJoystick, Dispatcher<VirtualTransport>) {
    let stick = VirtualJoystick::new();
    let d = Dispatcher::new(stick.transport(), Config::default());
    (stick, d)
}

fn call(d: &mut Dispatcher<VirtualTransport>, args: &[Value]) -> Value {
    let resp = d.dispatch(args).expect("valid command");
    serde_json::to_value(resp).expect("response serializes")
}

// ---------------------------------------------------------------------------
// read
// ---------------------------------------------------------------------------

#[test]
fn read_decodes_reference_report() {
    let (stick, mut d) = dispatcher();
    stick.feed_report([0x81, 0x7F, 0x00, 0x01, 0xFF]);

    assert_eq!(call(&mut d, &[json!("read")]), json!([-127, 127, 0, 1, 255]));
}

#[test]
fn read_opens_lazily_without_connect_step() {
    let (stick, mut d) = dispatcher();
    assert!(!d.is_open());
    stick.push_state(10, -10, 0, false, 128);

    let sample = d.read(None).expect("sample");
    assert_eq!(sample.to_array(), [10, -10, 0, 0, 128]);
    assert!(d.is_open());
    assert_eq!(stick.open_count(), 1);
}

#[test]
fn read_uses_default_and_explicit_timeouts() {
    let (stick, mut d) = dispatcher();

    call(&mut d, &[json!("read")]);
    assert_eq!(stick.last_timeout_ms(), Some(100));

    call(&mut d, &[json!("read"), json!(0)]);
    assert_eq!(stick.last_timeout_ms(), Some(0));

    call(&mut d, &[json!("read"), json!(250)]);
    assert_eq!(stick.last_timeout_ms(), Some(250));
}

#[test]
fn read_default_timeout_comes_from_config() {
    let stick = VirtualJoystick::new();
    let config = Config::from_toml_str("[read]\ndefault_timeout_ms = 15\n").expect("config");
    let mut d = Dispatcher::new(stick.transport(), config);

    assert_eq!(d.config().read.default_timeout_ms, 15);
    d.read(None);
    assert_eq!(stick.last_timeout_ms(), Some(15));
}

#[test]
fn read_with_unusable_timeout_falls_back_to_default() {
    let (stick, mut d) = dispatcher();
    for timeout in [json!("50"), json!(true), json!([50]), json!({"ms": 50}), json!(-5)] {
        stick.push_state(0, 0, 0, false, 7);
        assert_eq!(
            call(&mut d, &[json!("read"), timeout]),
            json!([0, 0, 0, 0, 7])
        );
        assert_eq!(stick.last_timeout_ms(), Some(100));
    }
    assert_eq!(stick.reads_issued(), 5);
}

#[test]
fn listeners_can_be_muted_through_dispatcher() {
    let (stick, mut d) = dispatcher();
    let seen = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&seen);
    let id = d.add_listener(
        move |_: &ReadOutcome| *counter.borrow_mut() += 1,
        OutcomeFilter::All,
    );

    d.read(Some(0));
    d.listeners_mut().disable(id);
    d.read(Some(0));
    assert_eq!(*seen.borrow(), 1);

    assert!(d.listeners_mut().remove_listener(id));
    assert!(d.listeners_mut().is_empty());
    assert_eq!(stick.reads_issued(), 2);
}

#[test]
fn timeout_and_transport_error_look_the_same_externally() {
    let (stick, mut d) = dispatcher();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    d.add_listener(
        move |o: &ReadOutcome| sink.borrow_mut().push(o.clone()),
        OutcomeFilter::All,
    );

    stick.feed(ReadStep::Timeout);
    stick.feed(ReadStep::Fail("device disconnected".into()));

    let timed_out = call(&mut d, &[json!("read")]);
    let failed = call(&mut d, &[json!("read")]);
    assert_eq!(timed_out, json!([]));
    assert_eq!(timed_out, failed);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], ReadOutcome::NoData);
    assert!(matches!(
        seen[1],
        ReadOutcome::Error(ReadFailure::Transport(_))
    ));
}

#[test]
fn read_on_missing_device_is_empty_not_error() {
    let (stick, mut d) = dispatcher();
    stick.unplug();

    let resp = d.dispatch(&[json!("read")]).expect("read never fails");
    assert_eq!(resp, Response::Empty);
    assert!(!d.is_open());
}

#[test]
fn read_never_partially_decodes() {
    let (stick, mut d) = dispatcher();
    let failures = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&failures);
    d.add_listener(
        move |_: &ReadOutcome| *counter.borrow_mut() += 1,
        OutcomeFilter::FailuresOnly,
    );

    stick.feed(ReadStep::Report(vec![0x81, 0x7F, 0x00, 0x01]));
    stick.feed(ReadStep::Report(vec![0x81, 0x7F, 0x00, 0x01, 0xFF, 0x00]));
    assert_eq!(d.read(Some(5)), None);
    assert_eq!(d.read(Some(5)), None);
    assert_eq!(*failures.borrow(), 2);
}

#[test]
fn disconnect_mid_session_does_not_force_reopen() {
    let (stick, mut d) = dispatcher();
    stick.push_state(0, 0, 0, false, 0);
    assert!(d.read(None).is_some());

    stick.unplug();
    assert_eq!(d.read(None), None);
    assert!(d.is_open(), "handle is kept after a read error");

    stick.plug_in();
    stick.push_state(1, 1, 1, true, 1);
    assert!(d.read(None).is_some());
    assert_eq!(stick.open_count(), 1);
}

#[test]
fn device_plugged_in_after_start_is_picked_up() {
    let (stick, mut d) = dispatcher();
    stick.unplug();
    assert_eq!(d.read(Some(0)), None);

    stick.plug_in();
    stick.push_state(0, 0, 0, true, 0);
    assert_eq!(d.read(Some(0)).map(|s| s.button), Some(1));
}

// ---------------------------------------------------------------------------
// info
// ---------------------------------------------------------------------------

#[test]
fn info_connected_reports_descriptors() {
    let (stick, mut d) = dispatcher();
    stick.set_serial_number(Ok(Some("M0001".into())));

    assert_eq!(
        call(&mut d, &[json!("info")]),
        json!({
            "connected": true,
            "vendor_id": 0x1313,
            "product_id": 0x9000,
            "manufacturer": "Thorlabs",
            "product": "MJC3 Joystick",
            "serial_number": "M0001",
        })
    );
    assert!(d.is_open());
}

#[test]
fn info_disconnected_keeps_ids() {
    let (stick, mut d) = dispatcher();
    stick.unplug();

    let info = d.info();
    assert!(!info.connected);
    assert_eq!(info.vendor_id, 0x1313);
    assert_eq!(info.product_id, 0x9000);
    assert_eq!(info.product, None);
}

#[test]
fn info_descriptor_failures_fall_back_per_field() {
    let (stick, mut d) = dispatcher();
    stick.set_manufacturer(Err("pipe error".into()));
    stick.set_serial_number(Ok(None));

    let info = d.info();
    assert!(info.connected);
    assert_eq!(info.manufacturer.as_deref(), Some("Thorlabs"));
    assert_eq!(info.product.as_deref(), Some("MJC3 Joystick"));
    assert_eq!(info.serial_number.as_deref(), Some("Unknown"));
}

#[test]
fn info_placeholder_policy() {
    let stick = VirtualJoystick::new();
    stick.set_product(Ok(Some("Custom Name".into())));
    let mut config = Config::default();
    config.descriptors.policy = DescriptorPolicy::Placeholder;
    let mut d = Dispatcher::new(stick.transport(), config);

    assert_eq!(d.info().product.as_deref(), Some("MJC3 Joystick"));
}

// ---------------------------------------------------------------------------
// test / close
// ---------------------------------------------------------------------------

#[test]
fn test_command_never_touches_device() {
    let (stick, mut d) = dispatcher();
    stick.fail_init("should not be called");

    assert_eq!(call(&mut d, &[json!("test")]), json!(true));
    assert_eq!(stick.open_count(), 0);
    assert_eq!(stick.reads_issued(), 0);
}

#[test]
fn close_is_idempotent() {
    let (stick, mut d) = dispatcher();
    assert_eq!(call(&mut d, &[json!("close")]), json!(true));

    d.read(Some(0));
    assert!(d.is_open());
    assert_eq!(call(&mut d, &[json!("close")]), json!(true));
    assert_eq!(call(&mut d, &[json!("close")]), json!(true));
    assert!(!d.is_open());
    assert_eq!(stick.close_count(), 1);
}

#[test]
fn reopen_after_close() {
    let (stick, mut d) = dispatcher();
    assert!(d.info().connected);
    d.close();
    assert!(!d.is_open());

    stick.push_state(3, 2, 1, false, 0);
    assert!(d.read(None).is_some());
    assert!(d.info().connected);
    assert_eq!(stick.open_count(), 2);
}

#[test]
fn dropping_dispatcher_releases_device_once() {
    let stick = VirtualJoystick::new();
    {
        let mut d = Dispatcher::new(stick.transport(), Config::default());
        d.read(Some(0));
    }
    assert_eq!(stick.close_count(), 1);
    assert_eq!(stick.shutdown_count(), 1);
}

// ---------------------------------------------------------------------------
// integration errors
// ---------------------------------------------------------------------------

#[test]
fn unknown_command_is_hard_failure() {
    let (stick, mut d) = dispatcher();
    for name in ["reset", "", "Read", "open"] {
        assert_eq!(
            d.dispatch(&[json!(name)]),
            Err(CommandError::UnknownCommand(name.to_string()))
        );
    }
    assert_eq!(stick.open_count(), 0);
}

#[test]
fn missing_or_non_string_command_is_hard_failure() {
    let (stick, mut d) = dispatcher();
    assert_eq!(d.dispatch(&[]), Err(CommandError::MissingCommand));
    assert_eq!(
        d.dispatch(&[json!(["read"])]),
        Err(CommandError::InvalidCommandType)
    );
    assert_eq!(
        d.dispatch(&[json!(42)]),
        Err(CommandError::InvalidCommandType)
    );
    assert_eq!(stick.open_count(), 0);
}
