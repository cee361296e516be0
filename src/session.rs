//! Device session: the one open handle to the joystick.
//!
//! [`DeviceSession`] owns a [`Transport`] and at most one open [`HidHandle`]. It opens lazily,
//! closes idempotently and can be reopened any number of times. Dropping the session closes
//! it, so teardown releases the OS handle exactly once whether or not `close` was called.
//!
//! The session has no internal locking; calls go through `&mut self`.

use crate::device::{DeviceIdentity, HidHandle, Transport};
use crate::error::OpenError;
use tracing::{debug, warn};

pub struct DeviceSession<T: Transport> {
    identity: DeviceIdentity,
    transport: T,
    handle: Option<T::Handle>,
}

impl<T: Transport> DeviceSession<T> {
    /// Create a closed session for the MJC3.
    pub fn new(transport: T) -> Self {
        Self::with_identity(transport, DeviceIdentity::MJC3)
    }

    pub fn with_identity(transport: T, identity: DeviceIdentity) -> Self {
        Self {
            identity,
            transport,
            handle: None,
        }
    }

    #[inline]
    pub fn identity(&self) -> DeviceIdentity {
        self.identity
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Open the device unless it is already open.
    pub fn ensure_open(&mut self) -> Result<(), OpenError> {
        self.live_handle().map(|_| ())
    }

    fn live_handle(&mut self) -> Result<&mut T::Handle, OpenError> {
        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => self.acquire()?,
        };
        Ok(self.handle.insert(handle))
    }

    fn acquire(&mut self) -> Result<T::Handle, OpenError> {
        let mut handle = self
            .transport
            .open(self.identity)
            .map_err(|reason| OpenError {
                identity: self.identity,
                reason,
            })?;

        // Reads are bounded by their own timeout; a failure here leaves the
        // backend's default mode in place, which still honours the timeout.
        if let Err(e) = handle.set_nonblocking(true) {
            warn!(device = %self.identity, error = %e, "could not enable non-blocking mode");
        }

        debug!(device = %self.identity, "device session opened");
        Ok(handle)
    }

    /// Release the handle and shut the transport down. No-op when already closed.
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            drop(handle);
            self.transport.shutdown();
            debug!(device = %self.identity, "device session closed");
        }
    }

    /// Run `f` against the live handle, opening the session first if needed.
    pub fn with_open_device<R>(
        &mut self,
        f: impl FnOnce(&mut T::Handle) -> R,
    ) -> Result<R, OpenError> {
        self.live_handle().map(f)
    }
}

impl<T: Transport> Drop for DeviceSession<T> {
    fn drop(&mut self) {
        self.close();
    }
}
