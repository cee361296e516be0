//! mjc3: session, polling and command surface for the Thorlabs MJC3 USB HID joystick.
//!
//! The crate opens the joystick (VID `0x1313`, PID `0x9000`) lazily, reads its 5-byte input
//! reports with a bounded timeout, and exposes the four commands `read`, `info`, `test` and
//! `close` through [`Dispatcher`].
//!
//! Everything is synchronous and single-threaded. The only blocking call is the
//! timeout-bounded read; hosts that need a steady stream poll in their own loop.
//!
//! ```no_run
//! # #[cfg(feature = "hid")] {
//! use mjc3::backends::HidApiTransport;
//! use mjc3::{Config, Dispatcher};
//!
//! let mut joystick = Dispatcher::new(HidApiTransport::new(), Config::default());
//! if let Some(sample) = joystick.read(Some(50)) {
//!     println!("{:?}", sample.to_array());
//! }
//! # }
//! ```

pub mod backends;
pub mod config;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod eventbus;
pub mod logger;
pub mod metadata;
pub mod poll;
pub mod session;

pub use config::*;
pub use device::*;
pub use dispatcher::*;
pub use error::*;
pub use event::*;
pub use eventbus::*;
pub use metadata::*;
pub use poll::{decode, RawReport, DEFAULT_TIMEOUT_MS, REPORT_SIZE};
pub use session::*;
