//! `hidapi` backend.
//!
//! [`HidApiTransport`] keeps the `HidApi` context alive only while a device is open: it is
//! created on [`open`](Transport::open), dropped again if the device cannot be opened, and
//! dropped by [`shutdown`](Transport::shutdown) when the session closes.
//!
//! All `hidapi::HidError`s are converted to [`TransportError`] here.

use crate::device::{DeviceIdentity, HidHandle, Transport};
use crate::error::TransportError;
use hidapi::{HidApi, HidDevice};
use tracing::debug;

#[derive(Default)]
pub struct HidApiTransport {
    api: Option<HidApi>,
}

impl HidApiTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for HidApiTransport {
    type Handle = HidApiHandle;

    fn open(&mut self, identity: DeviceIdentity) -> Result<HidApiHandle, TransportError> {
        if self.api.is_none() {
            let api = HidApi::new().map_err(|e| TransportError::Init(e.to_string()))?;
            self.api = Some(api);
        }

        let opened = match &self.api {
            Some(api) => api.open(identity.vendor_id, identity.product_id),
            None => return Err(TransportError::Init("HID context unavailable".into())),
        };

        match opened {
            Ok(raw) => {
                debug!(device = %identity, "hidapi device opened");
                Ok(HidApiHandle { raw })
            }
            Err(e) => {
                self.api = None;
                Err(TransportError::Open(identity, e.to_string()))
            }
        }
    }

    fn shutdown(&mut self) {
        self.api = None;
    }
}

/// Open `hidapi` device. Closed on drop.
pub struct HidApiHandle {
    raw: HidDevice,
}

impl HidHandle for HidApiHandle {
    fn set_nonblocking(&mut self, nonblocking: bool) -> Result<(), TransportError> {
        self.raw
            .set_blocking_mode(!nonblocking)
            .map_err(|e| TransportError::Mode(e.to_string()))
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, TransportError> {
        // hidapi treats negative timeouts as "block forever"; clamp instead.
        let timeout = i32::try_from(timeout_ms).unwrap_or(i32::MAX);
        self.raw
            .read_timeout(buf, timeout)
            .map_err(|e| TransportError::Read(e.to_string()))
    }

    fn manufacturer_string(&self) -> Result<Option<String>, TransportError> {
        self.raw
            .get_manufacturer_string()
            .map_err(|e| TransportError::Descriptor(e.to_string()))
    }

    fn product_string(&self) -> Result<Option<String>, TransportError> {
        self.raw
            .get_product_string()
            .map_err(|e| TransportError::Descriptor(e.to_string()))
    }

    fn serial_number_string(&self) -> Result<Option<String>, TransportError> {
        self.raw
            .get_serial_number_string()
            .map_err(|e| TransportError::Descriptor(e.to_string()))
    }
}
