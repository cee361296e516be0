//! Device information reported by `info`.
//!
//! [`DeviceInfo`] is produced on demand and never cached. The vendor/product ids are always
//! the MJC3 constants. The three descriptor strings are best-effort:
//!
//! - When the device is **not connected** they are `None`.
//! - When it is connected, each string comes from the device's descriptor. If the query fails,
//!   returns nothing, returns an empty string, or exceeds the configured bound, the field's
//!   fixed fallback from [`DescriptorField::fallback`] is used instead.
//! - With [`DescriptorPolicy::Placeholder`] the fallbacks are always used.

use crate::config::{DescriptorConfig, DescriptorPolicy};
use crate::device::{DeviceIdentity, HidHandle};
use crate::error::TransportError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One of the three USB string descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriptorField {
    Manufacturer,
    Product,
    SerialNumber,
}

impl DescriptorField {
    /// Value reported when the descriptor cannot be read.
    pub const fn fallback(self) -> &'static str {
        match self {
            DescriptorField::Manufacturer => "Thorlabs",
            DescriptorField::Product => "MJC3 Joystick",
            DescriptorField::SerialNumber => "Unknown",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            DescriptorField::Manufacturer => "manufacturer",
            DescriptorField::Product => "product",
            DescriptorField::SerialNumber => "serial_number",
        }
    }

    fn query<H: HidHandle>(self, handle: &H) -> Result<Option<String>, TransportError> {
        match self {
            DescriptorField::Manufacturer => handle.manufacturer_string(),
            DescriptorField::Product => handle.product_string(),
            DescriptorField::SerialNumber => handle.serial_number_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub connected: bool,
    pub vendor_id: u16,
    pub product_id: u16,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
}

impl DeviceInfo {
    /// Info for a device that could not be opened.
    pub fn disconnected(identity: DeviceIdentity) -> Self {
        Self {
            connected: false,
            vendor_id: identity.vendor_id,
            product_id: identity.product_id,
            manufacturer: None,
            product: None,
            serial_number: None,
        }
    }

    /// Info for an open device, querying descriptor strings per `config`.
    pub fn from_handle<H: HidHandle>(
        identity: DeviceIdentity,
        handle: &H,
        config: &DescriptorConfig,
    ) -> Self {
        let field = |f: DescriptorField| Some(resolve_descriptor(f, handle, config));
        Self {
            connected: true,
            vendor_id: identity.vendor_id,
            product_id: identity.product_id,
            manufacturer: field(DescriptorField::Manufacturer),
            product: field(DescriptorField::Product),
            serial_number: field(DescriptorField::SerialNumber),
        }
    }
}

/// Reject strings longer than `max_chars` instead of silently cutting them.
pub fn bounded(value: String, max_chars: usize) -> Result<String, TransportError> {
    let len = value.chars().count();
    if len > max_chars {
        return Err(TransportError::DescriptorTooLong {
            len,
            max: max_chars,
        });
    }
    Ok(value)
}

/// Query one descriptor string, substituting the field's fallback on any failure.
pub fn resolve_descriptor<H: HidHandle>(
    field: DescriptorField,
    handle: &H,
    config: &DescriptorConfig,
) -> String {
    if config.policy == DescriptorPolicy::Placeholder {
        return field.fallback().to_string();
    }

    let queried = field
        .query(handle)
        .and_then(|v| v.map(|s| bounded(s, config.max_chars)).transpose());

    match queried {
        Ok(Some(s)) if !s.trim().is_empty() => s,
        Ok(_) => field.fallback().to_string(),
        Err(e) => {
            warn!(field = field.name(), error = %e, "descriptor query failed; using fallback");
            field.fallback().to_string()
        }
    }
}
