//! Logging setup and the outcome logger.

use crate::event::ReadOutcome;
use crate::eventbus::OutcomeListener;
use tracing::{debug, trace, warn};
use tracing_subscriber::EnvFilter;

/// Install a `tracing` fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (e.g. `"mjc3=debug"`) is used.
/// Returns `false` if a global subscriber was already installed.
pub fn init(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// A listener that logs every read outcome.
#[derive(Debug, Default)]
pub struct OutcomeLogger;

impl OutcomeLogger {
    pub fn new() -> Self {
        OutcomeLogger
    }
}

impl OutcomeListener for OutcomeLogger {
    fn on_outcome(&mut self, outcome: &ReadOutcome) {
        match outcome {
            ReadOutcome::Sample(s) => debug!(
                x = s.x,
                y = s.y,
                z = s.z,
                button = s.button,
                speed_knob = s.speed_knob,
                "sample"
            ),
            ReadOutcome::NoData => trace!("read timed out"),
            ReadOutcome::Error(e) => warn!(error = %e, "read failed"),
        }
    }
}
