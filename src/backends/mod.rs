//! Transport backends for `mjc3`.
//!
//! Implementations of [`Transport`](crate::device::Transport) and
//! [`HidHandle`](crate::device::HidHandle).
//!
//! # Feature flags
//! - **`hid`** (default): the `hidapi` backend for real hardware.
//!
//! The virtual backend is always available; it needs no hardware or system libraries.

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
pub mod hid;

pub mod virtual_input;

#[cfg(feature = "hid")]
pub use hid::{HidApiHandle, HidApiTransport};
pub use virtual_input::{ReadStep, VirtualHandle, VirtualJoystick, VirtualTransport};
