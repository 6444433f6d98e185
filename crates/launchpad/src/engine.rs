//! Admission and accounting engine.
//!
//! [`Launchpad`] is the public surface: it gates operator calls through the
//! admin check, admits or rejects mints, moves payment, drives issuance and
//! publishes events.
//!
//! ## Mint pipeline
//!
//! A request for zero units is refused before the round is looked up. Then,
//! with the round's lock held for the whole sequence:
//!
//! 1. Window check against the configured [`Clock`]
//! 2. Whitelist gate
//! 3. Exact payment
//! 4. Per-wallet cap
//! 5. Supply cap
//! 6. Payment to the beneficiary (skipped for zero-priced rounds)
//! 7. Issuance; on failure the payment is reversed and nothing is committed
//! 8. Counter commit
//!
//! The event is published after the lock is released.

use alloy_primitives::{Address, U256};
use parking_lot::Mutex;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    auth::AdminGate,
    clock::{Clock, SystemClock},
    config::LaunchpadConfig,
    error::{LaunchpadError, SnapshotError},
    events::{EventSink, LaunchpadEvent, TracingEventSink},
    gateway::{ItemIssuer, PaymentGateway},
    snapshot::{FileSnapshotStore, LaunchpadSnapshot, SNAPSHOT_VERSION},
    store::RoundStore,
    types::{MintReceipt, MintRequest, Round, RoundConfig, RoundId},
    whitelist::WhitelistRegistry,
};

/// Units issued by a successful mint, whatever amount was requested.
pub const UNITS_PER_MINT: u64 = 1;

/// A set of launch rounds sharing one admin, issuer and payment gateway.
#[derive(Debug)]
pub struct Launchpad<I, P> {
    gate: AdminGate,
    rounds: RoundStore,
    whitelist: WhitelistRegistry,
    issuer: I,
    payments: P,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
    snapshots: Option<FileSnapshotStore>,
    checkpoint_on_write: bool,
    checkpoint_lock: Mutex<()>,
    checkpoint_healthy: AtomicBool,
}

impl<I, P> Launchpad<I, P>
where
    I: ItemIssuer,
    P: PaymentGateway,
{
    /// Creates an empty, in-memory launchpad administered by `admin`.
    pub fn new(admin: Address, issuer: I, payments: P) -> Self {
        let gate = AdminGate::new(admin);
        Self::assemble(gate, RoundStore::new(gate), WhitelistRegistry::new(gate), issuer, payments)
    }

    /// Rebuilds a launchpad from a snapshot.
    ///
    /// Fails if the snapshot is in an unknown format or any stored round
    /// breaks a round invariant.
    pub fn from_snapshot(
        admin: Address,
        snapshot: LaunchpadSnapshot,
        issuer: I,
        payments: P,
    ) -> Result<Self, SnapshotError> {
        snapshot.ensure_supported()?;
        let gate = AdminGate::new(admin);
        let rounds = RoundStore::restore(gate, snapshot.next_round_id, snapshot.rounds)?;
        let whitelist = WhitelistRegistry::restore(gate, snapshot.whitelist);
        Ok(Self::assemble(gate, rounds, whitelist, issuer, payments))
    }

    fn assemble(
        gate: AdminGate,
        rounds: RoundStore,
        whitelist: WhitelistRegistry,
        issuer: I,
        payments: P,
    ) -> Self {
        Self {
            gate,
            rounds,
            whitelist,
            issuer,
            payments,
            clock: Arc::new(SystemClock),
            events: Arc::new(TracingEventSink),
            snapshots: None,
            checkpoint_on_write: false,
            checkpoint_lock: Mutex::new(()),
            checkpoint_healthy: AtomicBool::new(true),
        }
    }

    /// Opens a launchpad as described by `config`, resuming from its snapshot
    /// when one exists.
    pub fn open(config: &LaunchpadConfig, issuer: I, payments: P) -> Result<Self, SnapshotError> {
        let Some(path) = &config.snapshot_path else {
            return Ok(Self::new(config.admin, issuer, payments));
        };

        let store = FileSnapshotStore::new(path);
        let snapshot = store.load()?.unwrap_or_default();
        tracing::info!(
            target: "launchpad",
            path = %store.path().display(),
            rounds = snapshot.rounds.len(),
            next_round_id = snapshot.next_round_id,
            "launchpad opened"
        );

        let mut launchpad = Self::from_snapshot(config.admin, snapshot, issuer, payments)?;
        launchpad.snapshots = Some(store);
        launchpad.checkpoint_on_write = config.checkpoint_on_write;
        Ok(launchpad)
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the event sink.
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// The admin address.
    pub const fn admin(&self) -> Address {
        self.gate.admin()
    }

    // === Round Store ===

    /// Creates a round with zeroed counters.
    pub fn create_round(
        &self,
        caller: Address,
        config: RoundConfig,
    ) -> Result<RoundId, LaunchpadError> {
        let round_id = self.rounds.create_round(caller, config.clone())?;
        self.publish(LaunchpadEvent::RoundCreated { round_id, config });
        Ok(round_id)
    }

    /// Replaces a round's configuration. Minted counts are preserved.
    pub fn update_round(
        &self,
        caller: Address,
        round_id: RoundId,
        config: RoundConfig,
    ) -> Result<(), LaunchpadError> {
        self.rounds.update_round(caller, round_id, config.clone())?;
        self.publish(LaunchpadEvent::RoundUpdated { round_id, config });
        Ok(())
    }

    /// Flips a round's whitelist gate and returns the new setting.
    pub fn toggle_whitelist_only(
        &self,
        caller: Address,
        round_id: RoundId,
    ) -> Result<bool, LaunchpadError> {
        let config = self.rounds.toggle_whitelist_only(caller, round_id)?;
        let whitelist_only = config.whitelist_only;
        self.publish(LaunchpadEvent::RoundUpdated { round_id, config });
        Ok(whitelist_only)
    }

    /// Configuration and state of a round.
    pub fn get_round(&self, round_id: RoundId) -> Result<Round, LaunchpadError> {
        self.rounds.get_round(round_id)
    }

    /// Ids of all rounds, ascending.
    pub fn round_ids(&self) -> Vec<RoundId> {
        self.rounds.round_ids()
    }

    /// Units issued to `wallet` in a round.
    pub fn minted_by(&self, round_id: RoundId, wallet: &Address) -> Result<u64, LaunchpadError> {
        Ok(self.rounds.get_round(round_id)?.state.minted_by(wallet))
    }

    // === Whitelist Registry ===

    /// Whitelists every address for the round. Already-present addresses are skipped.
    pub fn add_members(
        &self,
        caller: Address,
        round_id: RoundId,
        addresses: &[Address],
    ) -> Result<(), LaunchpadError> {
        let added = self.whitelist.add_members(caller, round_id, addresses)?;
        if added.is_empty() {
            return Ok(());
        }
        for address in added {
            self.events.emit(&LaunchpadEvent::WhitelistChanged {
                round_id,
                address,
                is_member: true,
            });
        }
        self.checkpoint_if_enabled();
        Ok(())
    }

    /// Whitelists a single address for the round.
    pub fn add_member(
        &self,
        caller: Address,
        round_id: RoundId,
        address: Address,
    ) -> Result<(), LaunchpadError> {
        self.add_members(caller, round_id, &[address])
    }

    /// Removes an address from the round's whitelist. No-op for non-members.
    pub fn remove_member(
        &self,
        caller: Address,
        round_id: RoundId,
        address: Address,
    ) -> Result<(), LaunchpadError> {
        if self.whitelist.remove_member(caller, round_id, address)? {
            self.publish(LaunchpadEvent::WhitelistChanged { round_id, address, is_member: false });
        }
        Ok(())
    }

    /// Whether `address` is whitelisted for the round.
    pub fn is_whitelisted(&self, round_id: RoundId, address: &Address) -> bool {
        self.whitelist.is_whitelisted(round_id, address)
    }

    /// Whitelisted addresses of the round, ascending.
    pub fn members(&self, round_id: RoundId) -> Vec<Address> {
        self.whitelist.members(round_id)
    }

    // === Admission & Accounting ===

    /// Admits a mint request and issues one unit to the buyer.
    ///
    /// All checks and effects run under the round's lock. If issuance fails
    /// the payment is reversed and no counter moves.
    pub fn mint(&self, request: MintRequest) -> Result<MintReceipt, LaunchpadError> {
        let MintRequest { round_id, buyer, payment, requested } = request;
        if requested == 0 {
            tracing::warn!(target: "launchpad", round_id, ?buyer, "mint rejected: zero amount");
            return Err(LaunchpadError::InvalidAmount);
        }
        if requested > UNITS_PER_MINT {
            tracing::debug!(
                target: "launchpad",
                round_id,
                ?buyer,
                requested,
                "requested amount ignored, issuing a single unit"
            );
        }

        let slot = self.rounds.slot(round_id)?;
        let receipt = {
            let mut round = slot.lock();
            if let Err(err) = self.admit(round_id, &round, buyer, payment) {
                tracing::warn!(target: "launchpad", round_id, ?buyer, %err, "mint rejected");
                return Err(err);
            }

            let staged = round.state.with_unit_minted(buyer, payment);

            // Zero-priced rounds move no value.
            let transfer = if payment.is_zero() {
                None
            } else {
                let transfer =
                    self.payments.pay(round.config.beneficiary, payment).inspect_err(|err| {
                        tracing::warn!(target: "launchpad", round_id, ?buyer, %err, "payment failed");
                    })?;
                Some(transfer)
            };

            let unit_id = match self.issuer.issue(round.config.item_contract, buyer) {
                Ok(unit_id) => unit_id,
                Err(err) => {
                    if let Some(transfer) = &transfer {
                        if let Err(reverse_err) = self.payments.reverse(transfer) {
                            tracing::error!(
                                target: "launchpad",
                                round_id,
                                ?buyer,
                                transfer_id = transfer.id,
                                %reverse_err,
                                "failed to reverse payment after issuance failure"
                            );
                        }
                    }
                    tracing::warn!(target: "launchpad", round_id, ?buyer, %err, "issuance failed");
                    return Err(err.into());
                }
            };

            round.state = staged;
            MintReceipt {
                round_id,
                unit_id,
                units_issued: UNITS_PER_MINT,
                minted_total: round.state.minted_total,
            }
        };

        tracing::info!(
            target: "launchpad",
            round_id,
            ?buyer,
            %payment,
            unit_id = %receipt.unit_id,
            minted_total = receipt.minted_total,
            "unit minted"
        );
        self.publish(LaunchpadEvent::UnitMinted {
            round_id,
            buyer,
            minted_total: receipt.minted_total,
            unit_id: receipt.unit_id,
        });
        Ok(receipt)
    }

    /// Runs the admission checks in their documented order.
    fn admit(
        &self,
        round_id: RoundId,
        round: &Round,
        buyer: Address,
        payment: U256,
    ) -> Result<(), LaunchpadError> {
        let config = &round.config;

        let now = self.clock.now();
        if !config.is_open_at(now) {
            return Err(LaunchpadError::OutsideWindow {
                round_id,
                now,
                start_time: config.start_time,
                end_time: config.end_time,
            });
        }

        if config.whitelist_only && !self.whitelist.is_whitelisted(round_id, &buyer) {
            return Err(LaunchpadError::NotWhitelisted { round_id, buyer });
        }

        if payment != config.unit_price {
            return Err(LaunchpadError::IncorrectPayment {
                expected: config.unit_price,
                received: payment,
            });
        }

        if round.state.minted_by(&buyer) >= config.max_per_wallet {
            return Err(LaunchpadError::WalletCapExceeded {
                round_id,
                buyer,
                max_per_wallet: config.max_per_wallet,
            });
        }

        if round.state.minted_total >= config.supply_cap {
            return Err(LaunchpadError::SupplyExhausted { round_id, supply_cap: config.supply_cap });
        }

        Ok(())
    }

    // === Persistence ===

    /// Copies the persisted state.
    ///
    /// Each round is copied under its own lock, so every round is internally
    /// consistent; rounds are not frozen relative to each other.
    pub fn snapshot(&self) -> LaunchpadSnapshot {
        LaunchpadSnapshot {
            version: SNAPSHOT_VERSION,
            next_round_id: self.rounds.next_round_id(),
            rounds: self.rounds.rounds(),
            whitelist: self.whitelist.entries(),
        }
    }

    /// Writes a snapshot to the configured path. No-op without one.
    pub fn checkpoint(&self) -> Result<(), SnapshotError> {
        let Some(store) = &self.snapshots else {
            return Ok(());
        };
        // Taking the snapshot under the lock keeps the newest state last on disk.
        let _guard = self.checkpoint_lock.lock();
        let result = store.save(&self.snapshot());
        self.checkpoint_healthy.store(result.is_ok(), Ordering::Release);
        result
    }

    /// Whether the most recent checkpoint succeeded.
    ///
    /// With write-through enabled, a failed checkpoint does not fail the
    /// mutation that triggered it; state committed since then is lost on
    /// restart until a later checkpoint succeeds.
    pub fn checkpoint_healthy(&self) -> bool {
        self.checkpoint_healthy.load(Ordering::Acquire)
    }

    fn publish(&self, event: LaunchpadEvent) {
        self.events.emit(&event);
        self.checkpoint_if_enabled();
    }

    fn checkpoint_if_enabled(&self) {
        if !self.checkpoint_on_write {
            return;
        }
        if let Err(err) = self.checkpoint() {
            tracing::error!(target: "launchpad", %err, "checkpoint failed");
        }
    }
}
