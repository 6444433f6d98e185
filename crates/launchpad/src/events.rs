//! Lifecycle notifications.
//!
//! Events are published after the state change that produced them has been
//! committed. Sinks cannot fail the operation: a sink that has nowhere to
//! deliver an event drops it.

use alloy_primitives::Address;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::types::{RoundConfig, RoundId, UnitId};

/// Notification emitted by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LaunchpadEvent {
    /// A round was created.
    #[serde(rename_all = "camelCase")]
    RoundCreated {
        /// New round id.
        round_id: RoundId,
        /// Initial configuration.
        config: RoundConfig,
    },
    /// A round's configuration was replaced.
    #[serde(rename_all = "camelCase")]
    RoundUpdated {
        /// Updated round.
        round_id: RoundId,
        /// Configuration now in effect.
        config: RoundConfig,
    },
    /// An address joined or left a round's whitelist.
    #[serde(rename_all = "camelCase")]
    WhitelistChanged {
        /// Affected round.
        round_id: RoundId,
        /// Affected address.
        address: Address,
        /// Membership after the change.
        is_member: bool,
    },
    /// A unit was issued.
    #[serde(rename_all = "camelCase")]
    UnitMinted {
        /// Round the unit was minted from.
        round_id: RoundId,
        /// Receiving address.
        buyer: Address,
        /// Round total after this mint.
        minted_total: u64,
        /// Identifier reported by the item contract.
        unit_id: UnitId,
    },
}

impl LaunchpadEvent {
    /// Stable name of the event kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RoundCreated { .. } => "round_created",
            Self::RoundUpdated { .. } => "round_updated",
            Self::WhitelistChanged { .. } => "whitelist_changed",
            Self::UnitMinted { .. } => "unit_minted",
        }
    }

    /// Round the event belongs to.
    pub const fn round_id(&self) -> RoundId {
        match self {
            Self::RoundCreated { round_id, .. } |
            Self::RoundUpdated { round_id, .. } |
            Self::WhitelistChanged { round_id, .. } |
            Self::UnitMinted { round_id, .. } => *round_id,
        }
    }
}

/// Receives published events.
pub trait EventSink: Send + Sync + std::fmt::Debug {
    /// Delivers one event. Must not block on slow consumers.
    fn emit(&self, event: &LaunchpadEvent);
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn emit(&self, event: &LaunchpadEvent) {
        (**self).emit(event);
    }
}

/// Writes events to the `launchpad::events` tracing target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &LaunchpadEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => tracing::info!(
                target: "launchpad::events",
                kind = event.kind(),
                round_id = event.round_id(),
                %payload,
                "event"
            ),
            Err(err) => tracing::warn!(
                target: "launchpad::events",
                kind = event.kind(),
                %err,
                "failed to encode event"
            ),
        }
    }
}

/// An event with its position in the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Position in the log, starting at 1.
    pub seq: u64,
    /// The event.
    pub event: LaunchpadEvent,
}

#[derive(Debug, Default)]
struct LogInner {
    last_seq: u64,
    events: Vec<LoggedEvent>,
}

/// Append-only in-memory event log.
#[derive(Debug, Default)]
pub struct EventLog {
    inner: Mutex<LogInner>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event logged so far, oldest first.
    pub fn events(&self) -> Vec<LoggedEvent> {
        self.inner.lock().events.clone()
    }

    /// Events logged after `seq`, oldest first.
    pub fn since(&self, seq: u64) -> Vec<LoggedEvent> {
        self.inner.lock().events.iter().filter(|logged| logged.seq > seq).cloned().collect()
    }

    /// Number of logged events.
    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    /// Whether nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: &LaunchpadEvent) {
        let mut inner = self.inner.lock();
        inner.last_seq += 1;
        let seq = inner.last_seq;
        inner.events.push(LoggedEvent { seq, event: event.clone() });
    }
}

/// Delivers every event to each inner sink in order.
#[derive(Debug, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    /// Creates a sink with no receivers.
    pub const fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Adds a receiver.
    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: &LaunchpadEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}
