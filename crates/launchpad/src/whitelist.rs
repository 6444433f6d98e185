//! Per-round whitelist membership.
//!
//! Entries are keyed by round id only; the registry does not consult the
//! round store, so membership can be prepared before a round exists and is
//! mutable regardless of the admission window.

use alloy_primitives::Address;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

use crate::{auth::AdminGate, error::LaunchpadError, types::RoundId};

/// Owner-mutable whitelist registry.
#[derive(Debug)]
pub struct WhitelistRegistry {
    gate: AdminGate,
    members: RwLock<BTreeMap<RoundId, BTreeSet<Address>>>,
}

impl WhitelistRegistry {
    /// Creates an empty registry administered by `gate`.
    pub fn new(gate: AdminGate) -> Self {
        Self { gate, members: RwLock::new(BTreeMap::new()) }
    }

    /// Rebuilds a registry from persisted entries.
    pub fn restore(gate: AdminGate, members: BTreeMap<RoundId, BTreeSet<Address>>) -> Self {
        let members = members.into_iter().filter(|(_, set)| !set.is_empty()).collect();
        Self { gate, members: RwLock::new(members) }
    }

    /// Marks every address as a member of the round.
    ///
    /// Returns the addresses that were not already members, in input order.
    pub fn add_members(
        &self,
        caller: Address,
        round_id: RoundId,
        addresses: &[Address],
    ) -> Result<Vec<Address>, LaunchpadError> {
        self.gate.ensure_admin(caller)?;

        let mut members = self.members.write();
        let set = members.entry(round_id).or_default();
        let added: Vec<Address> =
            addresses.iter().copied().filter(|address| set.insert(*address)).collect();
        if set.is_empty() {
            members.remove(&round_id);
        }

        tracing::info!(
            target: "launchpad",
            round_id,
            requested = addresses.len(),
            added = added.len(),
            "whitelist members added"
        );
        Ok(added)
    }

    /// Clears the address's membership. Returns whether it was a member.
    pub fn remove_member(
        &self,
        caller: Address,
        round_id: RoundId,
        address: Address,
    ) -> Result<bool, LaunchpadError> {
        self.gate.ensure_admin(caller)?;

        let mut members = self.members.write();
        let Some(set) = members.get_mut(&round_id) else {
            tracing::debug!(target: "launchpad", round_id, ?address, "remove of non-member");
            return Ok(false);
        };
        let removed = set.remove(&address);
        if set.is_empty() {
            members.remove(&round_id);
        }

        if removed {
            tracing::info!(target: "launchpad", round_id, ?address, "whitelist member removed");
        } else {
            tracing::debug!(target: "launchpad", round_id, ?address, "remove of non-member");
        }
        Ok(removed)
    }

    /// Whether `address` is whitelisted for the round. Absent means no.
    pub fn is_whitelisted(&self, round_id: RoundId, address: &Address) -> bool {
        self.members.read().get(&round_id).is_some_and(|set| set.contains(address))
    }

    /// Members of the round, ascending.
    pub fn members(&self, round_id: RoundId) -> Vec<Address> {
        self.members
            .read()
            .get(&round_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Copies every entry.
    pub fn entries(&self) -> BTreeMap<RoundId, BTreeSet<Address>> {
        self.members.read().clone()
    }
}
