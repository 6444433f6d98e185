//! Round store: owns every round's configuration and runtime state.
//!
//! Each round lives behind its own [`Mutex`], so work on one round never
//! waits on another. The outer [`RwLock`] is only held long enough to look up
//! or insert a slot.

use alloy_primitives::Address;
use parking_lot::{Mutex, RwLock};
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    auth::AdminGate,
    error::{LaunchpadError, SnapshotError},
    types::{Round, RoundConfig, RoundId},
};

type RoundSlot = Arc<Mutex<Round>>;

#[derive(Debug, Default)]
struct StoreInner {
    next_id: RoundId,
    rounds: BTreeMap<RoundId, RoundSlot>,
}

/// Mapping from round id to [`Round`], with admin-gated creation and update.
#[derive(Debug)]
pub struct RoundStore {
    gate: AdminGate,
    inner: RwLock<StoreInner>,
}

impl RoundStore {
    /// Creates an empty store administered by `gate`.
    pub fn new(gate: AdminGate) -> Self {
        Self { gate, inner: RwLock::new(StoreInner::default()) }
    }

    /// Rebuilds a store from persisted rounds.
    ///
    /// Id allocation resumes at `next_id`, or after the highest stored id if
    /// that is larger. Every round must satisfy the same invariants a live
    /// round does.
    pub fn restore(
        gate: AdminGate,
        next_id: RoundId,
        rounds: BTreeMap<RoundId, Round>,
    ) -> Result<Self, SnapshotError> {
        for (round_id, round) in &rounds {
            round
                .config
                .check()
                .and_then(|()| round.state.check_within(&round.config))
                .and_then(|()| round.state.check_totals())
                .map_err(|reason| SnapshotError::InvalidRound { round_id: *round_id, reason })?;
        }

        let next_id = match rounds.keys().next_back() {
            Some(last) => {
                let after_last = last.checked_add(1).ok_or(SnapshotError::InvalidRound {
                    round_id: *last,
                    reason: "round id leaves no room for allocation",
                })?;
                next_id.max(after_last)
            }
            None => next_id,
        };
        let rounds =
            rounds.into_iter().map(|(id, round)| (id, Arc::new(Mutex::new(round)))).collect();
        Ok(Self { gate, inner: RwLock::new(StoreInner { next_id, rounds }) })
    }

    /// Allocates the next id and stores `config` with zeroed state.
    pub fn create_round(
        &self,
        caller: Address,
        config: RoundConfig,
    ) -> Result<RoundId, LaunchpadError> {
        self.gate.ensure_admin(caller)?;
        config.validate()?;

        let mut inner = self.inner.write();
        let round_id = inner.next_id;
        inner.next_id = round_id.checked_add(1).ok_or(LaunchpadError::RoundIdsExhausted)?;
        inner.rounds.insert(round_id, Arc::new(Mutex::new(Round::new(config))));

        tracing::info!(target: "launchpad", round_id, "round created");
        Ok(round_id)
    }

    /// Replaces the configuration of an existing round. Runtime state is kept.
    pub fn update_round(
        &self,
        caller: Address,
        round_id: RoundId,
        config: RoundConfig,
    ) -> Result<(), LaunchpadError> {
        self.gate.ensure_admin(caller)?;
        let slot = self.slot(round_id)?;
        config.validate()?;

        let mut round = slot.lock();
        round.state.check_within(&config).map_err(LaunchpadError::InvalidConfig)?;
        round.config = config;
        tracing::info!(
            target: "launchpad",
            round_id,
            minted_total = round.state.minted_total,
            "round updated"
        );
        Ok(())
    }

    /// Flips the round's whitelist gate and returns the resulting configuration.
    pub fn toggle_whitelist_only(
        &self,
        caller: Address,
        round_id: RoundId,
    ) -> Result<RoundConfig, LaunchpadError> {
        self.gate.ensure_admin(caller)?;
        let slot = self.slot(round_id)?;

        let mut round = slot.lock();
        round.config.whitelist_only = !round.config.whitelist_only;
        tracing::info!(
            target: "launchpad",
            round_id,
            whitelist_only = round.config.whitelist_only,
            "whitelist gate toggled"
        );
        Ok(round.config.clone())
    }

    /// Returns a copy of the round's configuration and state.
    pub fn get_round(&self, round_id: RoundId) -> Result<Round, LaunchpadError> {
        Ok(self.slot(round_id)?.lock().clone())
    }

    /// Ids of all rounds, ascending.
    pub fn round_ids(&self) -> Vec<RoundId> {
        self.inner.read().rounds.keys().copied().collect()
    }

    /// The id the next created round will receive.
    pub fn next_round_id(&self) -> RoundId {
        self.inner.read().next_id
    }

    /// Copies every round, locking each in turn.
    pub fn rounds(&self) -> BTreeMap<RoundId, Round> {
        let slots: Vec<_> =
            self.inner.read().rounds.iter().map(|(id, slot)| (*id, slot.clone())).collect();
        slots.into_iter().map(|(id, slot)| (id, slot.lock().clone())).collect()
    }

    /// Shared handle to a round's lock.
    pub(crate) fn slot(&self, round_id: RoundId) -> Result<RoundSlot, LaunchpadError> {
        self.inner
            .read()
            .rounds
            .get(&round_id)
            .cloned()
            .ok_or(LaunchpadError::RoundNotFound(round_id))
    }
}
