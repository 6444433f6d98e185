//! Shared fixtures for launchpad integration tests.

#![allow(dead_code, unreachable_pub)]

use std::sync::Arc;

use alloy_primitives::{address, Address, U256};
use ev_launchpad::{
    EventLog, InMemoryCollection, InMemoryLedger, Launchpad, ManualClock, RoundConfig,
};

/// Launchpad admin used across tests.
pub const ADMIN: Address = address!("0x00000000000000000000000000000000000000a1");
/// Beneficiary of every test round.
pub const BENEFICIARY: Address = address!("0x00000000000000000000000000000000000000b1");
/// Item contract of every test round.
pub const ITEM_CONTRACT: Address = address!("0x00000000000000000000000000000000000000c1");
/// Default buyer.
pub const BUYER: Address = address!("0x00000000000000000000000000000000000000d1");
/// Address with no privileges.
pub const STRANGER: Address = address!("0x00000000000000000000000000000000000000ff");

/// Timestamp the fixture clock starts at.
pub const NOW: u64 = 1_710_338_135;

/// Launchpad type used by the fixtures.
pub type TestLaunchpad = Launchpad<Arc<InMemoryCollection>, Arc<InMemoryLedger>>;

/// A launchpad wired to inspectable in-memory collaborators.
pub struct Fixture {
    pub launchpad: TestLaunchpad,
    pub collection: Arc<InMemoryCollection>,
    pub ledger: Arc<InMemoryLedger>,
    pub clock: Arc<ManualClock>,
    pub events: Arc<EventLog>,
}

impl Fixture {
    /// Fresh in-memory launchpad administered by [`ADMIN`].
    pub fn new() -> Self {
        init_tracing();
        let collection = Arc::new(InMemoryCollection::new());
        let ledger = Arc::new(InMemoryLedger::new());
        let launchpad = Launchpad::new(ADMIN, collection.clone(), ledger.clone());
        Self::wire(launchpad, collection, ledger)
    }

    /// Attaches a manual clock and an event log to `launchpad`.
    pub fn wire(
        launchpad: TestLaunchpad,
        collection: Arc<InMemoryCollection>,
        ledger: Arc<InMemoryLedger>,
    ) -> Self {
        let clock = Arc::new(ManualClock::new(NOW));
        let events = Arc::new(EventLog::new());
        let launchpad = launchpad.with_clock(clock.clone()).with_event_sink(events.clone());
        Self { launchpad, collection, ledger, clock, events }
    }
}

/// Open, free, ungated round around [`NOW`].
pub fn free_round(supply_cap: u64, max_per_wallet: u64) -> RoundConfig {
    RoundConfig {
        item_contract: ITEM_CONTRACT,
        beneficiary: BENEFICIARY,
        unit_price: U256::ZERO,
        supply_cap,
        max_per_wallet,
        start_time: NOW - 60,
        end_time: NOW + 3_600,
        whitelist_only: false,
    }
}

/// 10 ether in wei.
pub fn ten_ether() -> U256 {
    U256::from(10u64).pow(U256::from(19u64))
}

/// Distinct buyer address derived from `n`.
pub fn buyer(n: u64) -> Address {
    let mut bytes = [0u8; 20];
    bytes[12..].copy_from_slice(&n.to_be_bytes());
    bytes[0] = 0xee;
    Address::from(bytes)
}

/// Installs a test-friendly subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
