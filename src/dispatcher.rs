//! Command dispatcher: the external contract.
//!
//! Four commands, each callable at any time and in any order:
//!
//! | Command | Args | Result |
//! |---|---|---|
//! | `read` | optional timeout (ms, default 100) | `[x, y, z, button, speed_knob]` or `[]` |
//! | `info` | none | `{connected, vendor_id, product_id, manufacturer, product, serial_number}` |
//! | `test` | none | `true` |
//! | `close` | none | `true` |
//!
//! Hosts that marshal their own values use [`Dispatcher::dispatch`] with `serde_json::Value`
//! arguments and serialize the returned [`Response`]. Rust callers can use the typed methods
//! directly.
//!
//! Device problems never fail a command: `read` answers "no data" and `info` answers
//! `connected = false`. Only integration mistakes (missing, non-string or unknown command)
//! come back as [`CommandError`].
//!
//! # Example
//! ```
//! use mjc3::backends::VirtualJoystick;
//! use mjc3::{Config, Dispatcher, Response};
//! use serde_json::json;
//!
//! let stick = VirtualJoystick::new();
//! stick.feed_report([0x81, 0x7F, 0x00, 0x01, 0xFF]);
//!
//! let mut d = Dispatcher::new(stick.transport(), Config::default());
//! let resp = d.dispatch(&[json!("read"), json!(50)]).unwrap();
//! assert_eq!(serde_json::to_value(&resp).unwrap(), json!([-127, 127, 0, 1, 255]));
//! assert_eq!(d.dispatch(&[json!("read")]).unwrap(), Response::Empty);
//! ```

use crate::config::Config;
use crate::device::Transport;
use crate::error::CommandError;
use crate::event::{JoystickSample, ReadOutcome};
use crate::eventbus::{OutcomeBus, OutcomeFilter, OutcomeListener};
use crate::metadata::DeviceInfo;
use crate::poll::poll;
use crate::session::DeviceSession;
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use serde_json::Value;
use tracing::{trace, warn};

/// A parsed command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// `None` means "use the configured default timeout".
    Read { timeout_ms: Option<u32> },
    Info,
    Test,
    Close,
}

impl Command {
    pub const NAMES: [&'static str; 4] = ["read", "info", "test", "close"];

    /// Parse `[name, args...]` as passed by a host.
    ///
    /// Extra arguments are ignored. `read` takes an optional numeric timeout; `null`, a
    /// non-numeric value or a negative number selects the default, and fractional values are
    /// truncated.
    pub fn parse(args: &[Value]) -> Result<Command, CommandError> {
        let (name, rest) = args.split_first().ok_or(CommandError::MissingCommand)?;
        let name = name.as_str().ok_or(CommandError::InvalidCommandType)?;

        match name {
            "read" => Ok(Command::Read {
                timeout_ms: parse_timeout(rest.first()),
            }),
            "info" => Ok(Command::Info),
            "test" => Ok(Command::Test),
            "close" => Ok(Command::Close),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Read { .. } => "read",
            Command::Info => "info",
            Command::Test => "test",
            Command::Close => "close",
        }
    }
}

/// A timeout that is not a usable number falls back to the default, like a missing one.
fn parse_timeout(arg: Option<&Value>) -> Option<u32> {
    let value = match arg {
        None | Some(Value::Null) => return None,
        Some(Value::Number(n)) => n,
        Some(other) => {
            warn!(timeout = %other, "non-numeric read timeout; using default");
            return None;
        }
    };

    if let Some(ms) = value.as_u64() {
        return Some(u32::try_from(ms).unwrap_or(u32::MAX));
    }
    match value.as_f64() {
        Some(ms) if ms.is_finite() && ms >= 0.0 => Some(ms.min(u32::MAX as f64) as u32),
        _ => {
            warn!(timeout = %value, "negative read timeout; using default");
            None
        }
    }
}

/// Result of one command, in the shapes of the command table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Sample(JoystickSample),
    /// `read` produced no data.
    Empty,
    Info(DeviceInfo),
    Flag(bool),
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Response::Sample(s) => s.to_array().serialize(serializer),
            Response::Empty => serializer.serialize_seq(Some(0))?.end(),
            Response::Info(info) => info.serialize(serializer),
            Response::Flag(b) => serializer.serialize_bool(*b),
        }
    }
}

/// Owns the device session and routes commands to it.
pub struct Dispatcher<T: Transport> {
    session: DeviceSession<T>,
    config: Config,
    listeners: OutcomeBus,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T, config: Config) -> Self {
        Self {
            session: DeviceSession::new(transport),
            config,
            listeners: OutcomeBus::new(),
        }
    }

    /// Parse and run a host command.
    pub fn dispatch(&mut self, args: &[Value]) -> Result<Response, CommandError> {
        let command = Command::parse(args)?;
        Ok(self.execute(command))
    }

    pub fn execute(&mut self, command: Command) -> Response {
        trace!(command = command.name(), "dispatch");
        match command {
            Command::Read { timeout_ms } => match self.read(timeout_ms) {
                Some(sample) => Response::Sample(sample),
                None => Response::Empty,
            },
            Command::Info => Response::Info(self.info()),
            Command::Test => Response::Flag(self.test()),
            Command::Close => Response::Flag(self.close()),
        }
    }

    /// One bounded read. Timeouts and failures both return `None`.
    pub fn read(&mut self, timeout_ms: Option<u32>) -> Option<JoystickSample> {
        let timeout_ms = timeout_ms.unwrap_or(self.config.read.default_timeout_ms);
        let outcome = poll(&mut self.session, timeout_ms);

        match &outcome {
            ReadOutcome::Error(e) => warn!(error = %e, "read failed"),
            ReadOutcome::NoData => trace!(timeout_ms, "no report within timeout"),
            ReadOutcome::Sample(_) => {}
        }
        self.listeners.emit(&outcome);
        outcome.sample()
    }

    pub fn info(&mut self) -> DeviceInfo {
        let identity = self.session.identity();
        let descriptors = &self.config.descriptors;
        match self
            .session
            .with_open_device(|h| DeviceInfo::from_handle(identity, h, descriptors))
        {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "device info unavailable");
                DeviceInfo::disconnected(identity)
            }
        }
    }

    /// Liveness check of the command surface. Does not touch the device.
    pub fn test(&self) -> bool {
        true
    }

    /// Close the session regardless of its state.
    pub fn close(&mut self) -> bool {
        self.session.close();
        true
    }

    pub fn add_listener(
        &mut self,
        listener: impl OutcomeListener + 'static,
        filter: OutcomeFilter,
    ) -> u64 {
        self.listeners.add_listener(listener, filter)
    }

    pub fn listeners_mut(&mut self) -> &mut OutcomeBus {
        &mut self.listeners
    }

    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
