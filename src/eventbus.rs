//! Read-outcome listeners.
//!
//! The dispatcher folds timeouts and failures into the same empty `read` result. Listeners
//! registered here see the full [`ReadOutcome`] of every read, so tests and host tooling can
//! still tell them apart.

use crate::event::ReadOutcome;
use std::collections::BTreeMap;

/// Trait for reacting to read outcomes.
pub trait OutcomeListener {
    fn on_outcome(&mut self, outcome: &ReadOutcome);
}

impl<F: FnMut(&ReadOutcome)> OutcomeListener for F {
    fn on_outcome(&mut self, outcome: &ReadOutcome) {
        self(outcome)
    }
}

/// Determines which outcomes a listener wants to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeFilter {
    All,
    SamplesOnly,
    /// Timeouts and errors.
    MissesOnly,
    FailuresOnly,
    Custom(fn(&ReadOutcome) -> bool),
}

impl OutcomeFilter {
    fn accepts(self, outcome: &ReadOutcome) -> bool {
        match self {
            OutcomeFilter::All => true,
            OutcomeFilter::SamplesOnly => matches!(outcome, ReadOutcome::Sample(_)),
            OutcomeFilter::MissesOnly => !matches!(outcome, ReadOutcome::Sample(_)),
            OutcomeFilter::FailuresOnly => outcome.is_failure(),
            OutcomeFilter::Custom(f) => f(outcome),
        }
    }
}

struct ListenerEntry {
    listener: Box<dyn OutcomeListener>,
    enabled: bool,
    filter: OutcomeFilter,
}

/// Registered listeners, notified in registration order.
#[derive(Default)]
pub struct OutcomeBus {
    next_id: u64,
    listeners: BTreeMap<u64, ListenerEntry>,
}

impl OutcomeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener and returns its id.
    pub fn add_listener(
        &mut self,
        listener: impl OutcomeListener + 'static,
        filter: OutcomeFilter,
    ) -> u64 {
        let id = self.next_id;
        self.listeners.insert(
            id,
            ListenerEntry {
                listener: Box::new(listener),
                enabled: true,
                filter,
            },
        );
        self.next_id += 1;
        id
    }

    pub fn enable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = true;
        }
    }

    /// Mutes a listener without removing it.
    pub fn disable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = false;
        }
    }

    pub fn remove_listener(&mut self, id: u64) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn emit(&mut self, outcome: &ReadOutcome) {
        for entry in self.listeners.values_mut() {
            if entry.enabled && entry.filter.accepts(outcome) {
                entry.listener.on_outcome(outcome);
            }
        }
    }
}
