//! Error types.
//!
//! Two families live here:
//! - **Operational** errors ([`TransportError`], [`OpenError`]) describe things that go wrong
//!   with the device at runtime. They are logged and turned into fallback values by the
//!   session/poll layer and never escape the dispatcher's public contract.
//! - **Integration** errors ([`CommandError`]) mean the host called the dispatcher incorrectly.
//!   They are always returned to the caller.

use crate::device::DeviceIdentity;
use thiserror::Error;

/// Failure reported by a [`Transport`](crate::device::Transport) or
/// [`HidHandle`](crate::device::HidHandle) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The HID library itself could not be initialized.
    #[error("failed to initialize HID library: {0}")]
    Init(String),

    /// No device with the requested identity is attached (or it could not be opened).
    ///
    /// The message leaves the identity out; [`OpenError`] already names it.
    #[error("open failed: {1}")]
    Open(DeviceIdentity, String),

    /// The handle rejected a blocking/non-blocking mode change.
    #[error("failed to set read mode: {0}")]
    Mode(String),

    /// A read on an open handle failed; usually the device was unplugged.
    #[error("HID read error: {0}")]
    Read(String),

    /// A descriptor string query failed.
    #[error("descriptor query failed: {0}")]
    Descriptor(String),

    /// A descriptor string exceeded the configured bound.
    #[error("descriptor string too long ({len} chars, max {max})")]
    DescriptorTooLong { len: usize, max: usize },
}

/// The device session could not be opened.
///
/// Recoverable: the device may be plugged in later and the next call retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot open MJC3 joystick ({identity}): {reason}")]
pub struct OpenError {
    pub identity: DeviceIdentity,
    #[source]
    pub reason: TransportError,
}

/// The host invoked the dispatcher incorrectly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("at least one input argument required")]
    MissingCommand,

    #[error("first argument must be a command string")]
    InvalidCommandType,

    #[error("unknown command '{0}'; valid commands: 'read', 'info', 'test', 'close'")]
    UnknownCommand(String),
}
