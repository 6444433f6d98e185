//! Round configuration, runtime state and the values returned by the engine.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::LaunchpadError;

/// Identifier of a round. Allocated monotonically and never reused.
pub type RoundId = u64;

/// Identifier of an issued unit, as reported by the item contract.
pub type UnitId = U256;

/// Parameters of a round. Replaced wholesale by an update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundConfig {
    /// Item contract that issues units for this round.
    pub item_contract: Address,
    /// Address credited with collected payment.
    pub beneficiary: Address,
    /// Exact price of one unit, in wei.
    pub unit_price: U256,
    /// Maximum number of units ever issued under this round.
    pub supply_cap: u64,
    /// Maximum number of units a single address may receive.
    pub max_per_wallet: u64,
    /// First admitted timestamp (unix seconds, inclusive).
    pub start_time: u64,
    /// Last admitted timestamp (unix seconds, inclusive).
    pub end_time: u64,
    /// When set, only whitelisted addresses may mint.
    #[serde(default)]
    pub whitelist_only: bool,
}

impl RoundConfig {
    /// Checks the constraints shared by round creation and update.
    ///
    /// A negative price is unrepresentable in [`U256`], so only the caps and
    /// the window need checking.
    pub fn validate(&self) -> Result<(), LaunchpadError> {
        self.check().map_err(LaunchpadError::InvalidConfig)
    }

    pub(crate) const fn check(&self) -> Result<(), &'static str> {
        if self.supply_cap == 0 {
            return Err("supply cap must be positive");
        }
        if self.max_per_wallet == 0 {
            return Err("max per wallet must be positive");
        }
        if self.start_time >= self.end_time {
            return Err("start time must precede end time");
        }
        Ok(())
    }

    /// Whether `now` falls inside the admission window.
    pub const fn is_open_at(&self, now: u64) -> bool {
        self.start_time <= now && now <= self.end_time
    }
}

/// Counters accumulated by successful mints. Never reset by an update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundState {
    /// Units issued so far.
    pub minted_total: u64,
    /// Units issued per receiving address.
    pub minted_by_wallet: BTreeMap<Address, u64>,
    /// Total payment received, in wei.
    pub collected: U256,
}

impl RoundState {
    /// Units already issued to `wallet`.
    pub fn minted_by(&self, wallet: &Address) -> u64 {
        self.minted_by_wallet.get(wallet).copied().unwrap_or_default()
    }

    /// Checks that the counters fit under `config`'s caps.
    pub(crate) fn check_within(&self, config: &RoundConfig) -> Result<(), &'static str> {
        if self.minted_total > config.supply_cap {
            return Err("supply cap below minted total");
        }
        if self.minted_by_wallet.values().any(|minted| *minted > config.max_per_wallet) {
            return Err("max per wallet below a wallet's minted count");
        }
        Ok(())
    }

    /// Checks that per-wallet counts add up to the round total.
    pub(crate) fn check_totals(&self) -> Result<(), &'static str> {
        let sum = self
            .minted_by_wallet
            .values()
            .try_fold(0u64, |sum, minted| sum.checked_add(*minted))
            .ok_or("wallet counts overflow")?;
        if sum != self.minted_total {
            return Err("wallet counts do not add up to minted total");
        }
        Ok(())
    }

    /// Returns the state after one more unit is issued to `buyer` for `payment`.
    ///
    /// Leaves `self` untouched so the caller can commit only once issuance succeeds.
    pub(crate) fn with_unit_minted(&self, buyer: Address, payment: U256) -> Self {
        let mut next = self.clone();
        next.minted_total += 1;
        *next.minted_by_wallet.entry(buyer).or_default() += 1;
        next.collected = next.collected.saturating_add(payment);
        next
    }
}

/// A round as held by the store: its configuration and runtime state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// Current configuration.
    pub config: RoundConfig,
    /// Runtime counters.
    pub state: RoundState,
}

impl Round {
    /// A fresh round with zeroed state.
    pub fn new(config: RoundConfig) -> Self {
        Self { config, state: RoundState::default() }
    }

    /// Units still available under the supply cap.
    pub const fn remaining_supply(&self) -> u64 {
        self.config.supply_cap.saturating_sub(self.state.minted_total)
    }
}

/// A mint request as submitted by a buyer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MintRequest {
    /// Round to mint from.
    pub round_id: RoundId,
    /// Address receiving the unit and paying for it.
    pub buyer: Address,
    /// Value attached to the request, in wei.
    pub payment: U256,
    /// Number of units the caller asked for. Must be positive; only one unit
    /// is ever issued.
    pub requested: u64,
}

impl MintRequest {
    /// A request for a single unit.
    pub const fn new(round_id: RoundId, buyer: Address, payment: U256) -> Self {
        Self { round_id, buyer, payment, requested: 1 }
    }

    /// Sets the requested amount.
    pub const fn with_requested(mut self, requested: u64) -> Self {
        self.requested = requested;
        self
    }
}

/// Outcome of a successful mint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MintReceipt {
    /// Round the unit was minted from.
    pub round_id: RoundId,
    /// Identifier returned by the item contract.
    pub unit_id: UnitId,
    /// Units issued by this call. Always one.
    pub units_issued: u64,
    /// Round total after this mint.
    pub minted_total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn config() -> RoundConfig {
        RoundConfig {
            item_contract: address!("0x00000000000000000000000000000000000000c1"),
            beneficiary: address!("0x00000000000000000000000000000000000000b1"),
            unit_price: U256::ZERO,
            supply_cap: 280,
            max_per_wallet: 1,
            start_time: 0,
            end_time: 100,
            whitelist_only: false,
        }
    }

    #[test]
    fn validate_rejects_zero_caps_and_empty_window() {
        assert!(config().validate().is_ok());

        let zero_supply = RoundConfig { supply_cap: 0, ..config() };
        assert!(matches!(zero_supply.validate(), Err(LaunchpadError::InvalidConfig(_))));

        let zero_wallet = RoundConfig { max_per_wallet: 0, ..config() };
        assert!(matches!(zero_wallet.validate(), Err(LaunchpadError::InvalidConfig(_))));

        let empty_window = RoundConfig { start_time: 100, end_time: 100, ..config() };
        assert!(matches!(empty_window.validate(), Err(LaunchpadError::InvalidConfig(_))));
    }

    #[test]
    fn counters_are_checked_against_caps_and_totals() {
        let buyer = address!("0x00000000000000000000000000000000000000d1");
        let state = RoundState::default().with_unit_minted(buyer, U256::ZERO);

        assert_eq!(state.check_within(&config()), Ok(()));
        assert_eq!(state.check_totals(), Ok(()));

        let two = state.with_unit_minted(buyer, U256::ZERO);
        assert_eq!(two.check_within(&config()), Err("max per wallet below a wallet's minted count"));
        let tiny = RoundConfig { supply_cap: 1, max_per_wallet: 5, ..config() };
        assert_eq!(two.check_within(&tiny), Err("supply cap below minted total"));

        let skewed = RoundState { minted_total: 3, ..two };
        assert_eq!(skewed.check_totals(), Err("wallet counts do not add up to minted total"));
    }

    #[test]
    fn window_is_inclusive_at_both_ends() {
        let cfg = RoundConfig { start_time: 10, end_time: 20, ..config() };
        assert!(!cfg.is_open_at(9));
        assert!(cfg.is_open_at(10));
        assert!(cfg.is_open_at(20));
        assert!(!cfg.is_open_at(21));
    }

    #[test]
    fn staged_mint_leaves_original_state_untouched() {
        let buyer = address!("0x00000000000000000000000000000000000000d1");
        let state = RoundState::default();

        let next = state.with_unit_minted(buyer, U256::from(7u64));

        assert_eq!(state, RoundState::default());
        assert_eq!(next.minted_total, 1);
        assert_eq!(next.minted_by(&buyer), 1);
        assert_eq!(next.collected, U256::from(7u64));
    }

    #[test]
    fn config_uses_camel_case_json() {
        let json = serde_json::to_value(config()).expect("serialize config");
        assert!(json.get("supplyCap").is_some());
        assert!(json.get("whitelistOnly").is_some());

        let mut without_flag = json;
        without_flag.as_object_mut().expect("object").remove("whitelistOnly");
        let parsed: RoundConfig = serde_json::from_value(without_flag).expect("deserialize");
        assert!(!parsed.whitelist_only);
    }
}
