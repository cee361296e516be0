//! In-process virtual joystick.
//!
//! [`VirtualJoystick`] is a scripted stand-in for the MJC3 and the HID library. It hands out
//! [`VirtualTransport`]s that share its state, so a test (or demo) keeps the joystick handle
//! and drives it while the dispatcher owns the transport.
//!
//! Reads are served from a queue of [`ReadStep`]s. An empty queue behaves like an idle device:
//! every read times out.

use crate::device::{DeviceIdentity, HidHandle, Transport};
use crate::error::TransportError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// What the next read on an open handle returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadStep {
    /// Deliver these bytes (may be any length, to exercise size checks).
    Report(Vec<u8>),
    /// Nothing arrives within the timeout.
    Timeout,
    /// The read fails with this message.
    Fail(String),
}

#[derive(Debug)]
struct State {
    identity: DeviceIdentity,
    present: bool,
    init_error: Option<String>,
    mode_error: Option<String>,
    reads: VecDeque<ReadStep>,
    manufacturer: Result<Option<String>, String>,
    product: Result<Option<String>, String>,
    serial_number: Result<Option<String>, String>,
    nonblocking: bool,
    last_timeout_ms: Option<u32>,
    reads_issued: usize,
    opens: usize,
    closes: usize,
    shutdowns: usize,
}

impl Default for State {
    fn default() -> Self {
        Self {
            identity: DeviceIdentity::MJC3,
            present: true,
            init_error: None,
            mode_error: None,
            reads: VecDeque::new(),
            manufacturer: Ok(Some("Thorlabs".into())),
            product: Ok(Some("MJC3 Joystick".into())),
            serial_number: Ok(Some("MJC3-VIRTUAL".into())),
            nonblocking: false,
            last_timeout_ms: None,
            reads_issued: 0,
            opens: 0,
            closes: 0,
            shutdowns: 0,
        }
    }
}

/// Control handle for a virtual joystick. Cheap to clone; all clones share state.
#[derive(Clone, Debug, Default)]
pub struct VirtualJoystick {
    state: Arc<Mutex<State>>,
}

impl VirtualJoystick {
    /// A plugged-in virtual MJC3 with an empty read queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// A transport that opens this joystick.
    pub fn transport(&self) -> VirtualTransport {
        VirtualTransport {
            state: Arc::clone(&self.state),
        }
    }

    pub fn plug_in(&self) {
        self.lock().present = true;
    }

    /// Detach the device. Open handles start failing reads; new opens fail.
    pub fn unplug(&self) {
        self.lock().present = false;
    }

    /// Make library initialization fail until [`clear_init_failure`](Self::clear_init_failure).
    pub fn fail_init(&self, reason: &str) {
        self.lock().init_error = Some(reason.to_string());
    }

    pub fn clear_init_failure(&self) {
        self.lock().init_error = None;
    }

    /// Make handles reject the switch to non-blocking mode.
    pub fn reject_nonblocking(&self, reason: &str) {
        self.lock().mode_error = Some(reason.to_string());
    }

    /// Queue a read step.
    pub fn feed(&self, step: ReadStep) {
        self.lock().reads.push_back(step);
    }

    /// Queue a raw 5-byte report.
    pub fn feed_report(&self, report: [u8; 5]) {
        self.feed(ReadStep::Report(report.to_vec()));
    }

    /// Convenience: queue a report built from decoded values.
    pub fn push_state(&self, x: i8, y: i8, z: i8, pressed: bool, speed_knob: u8) {
        self.feed_report([
            x as u8,
            y as u8,
            z as u8,
            u8::from(pressed),
            speed_knob,
        ]);
    }

    pub fn set_manufacturer(&self, value: Result<Option<String>, String>) {
        self.lock().manufacturer = value;
    }

    pub fn set_product(&self, value: Result<Option<String>, String>) {
        self.lock().product = value;
    }

    pub fn set_serial_number(&self, value: Result<Option<String>, String>) {
        self.lock().serial_number = value;
    }

    pub fn pending_reads(&self) -> usize {
        self.lock().reads.len()
    }

    pub fn reads_issued(&self) -> usize {
        self.lock().reads_issued
    }

    pub fn last_timeout_ms(&self) -> Option<u32> {
        self.lock().last_timeout_ms
    }

    pub fn is_nonblocking(&self) -> bool {
        self.lock().nonblocking
    }

    pub fn open_count(&self) -> usize {
        self.lock().opens
    }

    pub fn close_count(&self) -> usize {
        self.lock().closes
    }

    pub fn shutdown_count(&self) -> usize {
        self.lock().shutdowns
    }
}

/// [`Transport`] side of a [`VirtualJoystick`].
#[derive(Debug)]
pub struct VirtualTransport {
    state: Arc<Mutex<State>>,
}

impl Transport for VirtualTransport {
    type Handle = VirtualHandle;

    fn open(&mut self, identity: DeviceIdentity) -> Result<VirtualHandle, TransportError> {
        let mut st = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(reason) = &st.init_error {
            return Err(TransportError::Init(reason.clone()));
        }
        if !st.present || st.identity != identity {
            // Library came up but the device did not; release it again.
            st.shutdowns += 1;
            return Err(TransportError::Open(identity, "device not found".into()));
        }
        st.opens += 1;
        st.nonblocking = false;
        Ok(VirtualHandle {
            state: Arc::clone(&self.state),
        })
    }

    fn shutdown(&mut self) {
        let mut st = self.state.lock().unwrap_or_else(|e| e.into_inner());
        st.shutdowns += 1;
    }
}

/// [`HidHandle`] side of a [`VirtualJoystick`]. Dropping it counts as a close.
#[derive(Debug)]
pub struct VirtualHandle {
    state: Arc<Mutex<State>>,
}

impl VirtualHandle {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl HidHandle for VirtualHandle {
    fn set_nonblocking(&mut self, nonblocking: bool) -> Result<(), TransportError> {
        let mut st = self.lock();
        if let Some(reason) = &st.mode_error {
            return Err(TransportError::Mode(reason.clone()));
        }
        st.nonblocking = nonblocking;
        Ok(())
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, TransportError> {
        let mut st = self.lock();
        st.reads_issued += 1;
        st.last_timeout_ms = Some(timeout_ms);
        if !st.present {
            return Err(TransportError::Read("device disconnected".into()));
        }
        match st.reads.pop_front() {
            None | Some(ReadStep::Timeout) => Ok(0),
            Some(ReadStep::Fail(msg)) => Err(TransportError::Read(msg)),
            Some(ReadStep::Report(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                // Report the device's byte count, not the copied one, so oversize
                // reports stay visible to the caller.
                Ok(bytes.len())
            }
        }
    }

    fn manufacturer_string(&self) -> Result<Option<String>, TransportError> {
        self.lock()
            .manufacturer
            .clone()
            .map_err(TransportError::Descriptor)
    }

    fn product_string(&self) -> Result<Option<String>, TransportError> {
        self.lock().product.clone().map_err(TransportError::Descriptor)
    }

    fn serial_number_string(&self) -> Result<Option<String>, TransportError> {
        self.lock()
            .serial_number
            .clone()
            .map_err(TransportError::Descriptor)
    }
}

impl Drop for VirtualHandle {
    fn drop(&mut self) {
        self.lock().closes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_device_times_out() {
        let stick = VirtualJoystick::new();
        let mut transport = stick.transport();
        let mut handle = transport.open(DeviceIdentity::MJC3).expect("open");

        let mut buf = [0u8; 5];
        assert_eq!(handle.read_timeout(&mut buf, 10), Ok(0));
        assert_eq!(stick.last_timeout_ms(), Some(10));
    }

    #[test]
    fn test_reads_consume_queue_in_order() {
        let stick = VirtualJoystick::new();
        stick.feed(ReadStep::Timeout);
        stick.feed_report([1, 2, 3, 0, 4]);
        assert_eq!(stick.pending_reads(), 2);

        let mut transport = stick.transport();
        let mut handle = transport.open(DeviceIdentity::MJC3).expect("open");
        let mut buf = [0u8; 5];
        assert_eq!(handle.read_timeout(&mut buf, 0), Ok(0));
        assert_eq!(stick.pending_reads(), 1);
        assert_eq!(handle.read_timeout(&mut buf, 0), Ok(5));
        assert_eq!(stick.pending_reads(), 0);
        assert_eq!(stick.reads_issued(), 2);
    }

    #[test]
    fn test_wrong_identity_is_not_found() {
        let stick = VirtualJoystick::new();
        let mut transport = stick.transport();
        let other = DeviceIdentity {
            vendor_id: 0x046d,
            product_id: 0xc215,
        };
        assert!(matches!(
            transport.open(other),
            Err(TransportError::Open(id, _)) if id == other
        ));
    }

    #[test]
    fn test_push_state_encodes_twos_complement() {
        let stick = VirtualJoystick::new();
        stick.push_state(-1, 127, -127, true, 200);

        let mut transport = stick.transport();
        let mut handle = transport.open(DeviceIdentity::MJC3).expect("open");
        let mut buf = [0u8; 5];
        assert_eq!(handle.read_timeout(&mut buf, 0), Ok(5));
        assert_eq!(buf, [0xFF, 0x7F, 0x81, 0x01, 200]);
    }

    #[test]
    fn test_unplugged_handle_fails_reads() {
        let stick = VirtualJoystick::new();
        let mut transport = stick.transport();
        let mut handle = transport.open(DeviceIdentity::MJC3).expect("open");
        stick.unplug();

        let mut buf = [0u8; 5];
        assert!(matches!(
            handle.read_timeout(&mut buf, 0),
            Err(TransportError::Read(_))
        ));
    }
}
