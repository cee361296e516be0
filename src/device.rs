//! Device identity and the transport seam.
//!
//! The crate talks to hardware only through two traits:
//! - [`Transport`] initializes the HID library and opens a device by [`DeviceIdentity`].
//! - [`HidHandle`] is one open device: timeout-bounded reads and descriptor queries.
//!
//! The `hidapi` backend ([`backends::hid`](crate::backends)) implements them for real devices;
//! [`backends::virtual_input`](crate::backends::virtual_input) implements them in-process.

use crate::error::TransportError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// USB vendor/product id pair used to locate the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceIdentity {
    /// Thorlabs MJC3 joystick.
    pub const MJC3: DeviceIdentity = DeviceIdentity {
        vendor_id: 0x1313,
        product_id: 0x9000,
    };
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VID:{:04X}, PID:{:04X}", self.vendor_id, self.product_id)
    }
}

/// Opens devices. Owns whatever library-wide state the backend needs.
pub trait Transport {
    type Handle: HidHandle;

    /// Initialize the library (if needed) and open the first device matching `identity`.
    ///
    /// On failure the implementation must release anything it acquired along the way.
    fn open(&mut self, identity: DeviceIdentity) -> Result<Self::Handle, TransportError>;

    /// Release library-wide state. Called after the last handle has been dropped.
    fn shutdown(&mut self);
}

/// One open HID device.
///
/// Dropping the handle closes it.
pub trait HidHandle {
    /// Switch between blocking and non-blocking reads.
    fn set_nonblocking(&mut self, nonblocking: bool) -> Result<(), TransportError>;

    /// Read one input report into `buf`, waiting at most `timeout_ms`.
    ///
    /// Returns the number of bytes written, `0` when the timeout elapsed with nothing queued.
    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, TransportError>;

    fn manufacturer_string(&self) -> Result<Option<String>, TransportError>;

    fn product_string(&self) -> Result<Option<String>, TransportError>;

    fn serial_number_string(&self) -> Result<Option<String>, TransportError>;
}
