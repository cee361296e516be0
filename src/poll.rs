//! Poll-and-decode engine.
//!
//! [`poll`] performs exactly one timeout-bounded read through the session and classifies it
//! as a [`ReadOutcome`]. It never loops and never closes the session: after a transport error
//! the handle stays in place and the next poll retries it.

use crate::device::{HidHandle, Transport};
use crate::event::{JoystickSample, ReadFailure, ReadOutcome};
use crate::session::DeviceSession;

/// Size of an MJC3 input report in bytes.
pub const REPORT_SIZE: usize = 5;

/// Timeout used when the caller supplies none.
pub const DEFAULT_TIMEOUT_MS: u32 = 100;

/// One raw input report as it comes off the wire.
pub type RawReport = [u8; REPORT_SIZE];

/// Decode a report: bytes 0..=2 are `i8` axes, byte 3 the button, byte 4 the speed knob.
#[inline]
pub fn decode(report: &RawReport) -> JoystickSample {
    JoystickSample {
        x: report[0] as i8,
        y: report[1] as i8,
        z: report[2] as i8,
        button: report[3],
        speed_knob: report[4],
    }
}

/// Read once, waiting at most `timeout_ms`. `0` returns immediately when nothing is queued.
pub fn poll<T: Transport>(session: &mut DeviceSession<T>, timeout_ms: u32) -> ReadOutcome {
    let mut buf: RawReport = [0; REPORT_SIZE];

    let read = match session.with_open_device(|h| h.read_timeout(&mut buf, timeout_ms)) {
        Ok(read) => read,
        Err(e) => return ReadOutcome::Error(ReadFailure::DeviceUnavailable(e.to_string())),
    };

    match read {
        Err(e) => ReadOutcome::Error(ReadFailure::Transport(e.to_string())),
        Ok(0) => ReadOutcome::NoData,
        Ok(REPORT_SIZE) => ReadOutcome::Sample(decode(&buf)),
        Ok(got) => ReadOutcome::Error(ReadFailure::UnexpectedReportSize {
            got,
            expected: REPORT_SIZE,
        }),
    }
}
