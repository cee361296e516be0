//! Samples and read outcomes.
//!
//! A single read attempt produces exactly one [`ReadOutcome`]. Only the
//! [`Sample`](ReadOutcome::Sample) variant carries joystick data; timeouts and failures are
//! kept apart here so that logging and listeners can tell them apart, even though the
//! dispatcher reports both as "no data".
//!
//! ## Value conventions
//! - **Axes** (`x`, `y`, `z`): raw two's-complement bytes, `-128..=127`. The MJC3 reports
//!   `-127..=127` in practice.
//! - **Button**: raw byte, `0` released / `1` pressed. Not validated.
//! - **Speed knob**: raw byte, `0..=255`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decoded view of one 5-byte input report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoystickSample {
    pub x: i8,
    pub y: i8,
    pub z: i8,
    pub button: u8,
    pub speed_knob: u8,
}

impl JoystickSample {
    /// `[x, y, z, button, speed_knob]`, the order used on the command surface.
    pub fn to_array(&self) -> [i16; 5] {
        [
            i16::from(self.x),
            i16::from(self.y),
            i16::from(self.z),
            i16::from(self.button),
            i16::from(self.speed_knob),
        ]
    }

    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.button != 0
    }
}

/// Why a read attempt produced no sample (other than a plain timeout).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReadFailure {
    /// The session could not be opened.
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The transport reported an error on an open handle.
    #[error("{0}")]
    Transport(String),

    /// The transport returned a byte count that is neither 0 nor a full report.
    #[error("unexpected report size: {got} bytes (expected {expected})")]
    UnexpectedReportSize { got: usize, expected: usize },
}

/// Result of one bounded read attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A full report arrived and was decoded.
    Sample(JoystickSample),

    /// The timeout elapsed without a report. Not an error.
    NoData,

    /// The read could not be performed or its result was unusable.
    Error(ReadFailure),
}

impl ReadOutcome {
    /// The sample, if any. Timeouts and failures both map to `None`.
    pub fn sample(&self) -> Option<JoystickSample> {
        match self {
            ReadOutcome::Sample(s) => Some(*s),
            ReadOutcome::NoData | ReadOutcome::Error(_) => None,
        }
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, ReadOutcome::Error(_))
    }
}
