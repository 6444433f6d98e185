//! Snapshot checkpoints survive a restart.

mod common;

use std::sync::Arc;

use alloy_primitives::U256;
use common::*;
use ev_launchpad::{
    FileSnapshotStore, InMemoryCollection, InMemoryLedger, Launchpad, LaunchpadConfig,
    LaunchpadError, LaunchpadSnapshot, MintRequest, Round, RoundConfig, SnapshotError,
    SNAPSHOT_VERSION,
};

fn open(config: &LaunchpadConfig) -> Fixture {
    init_tracing();
    let collection = Arc::new(InMemoryCollection::new());
    let ledger = Arc::new(InMemoryLedger::new());
    let launchpad =
        Launchpad::open(config, collection.clone(), ledger.clone()).expect("open launchpad");
    Fixture::wire(launchpad, collection, ledger)
}

#[test]
fn state_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = LaunchpadConfig::new(ADMIN).with_snapshot_path(dir.path().join("launchpad.json"));

    let gated = RoundConfig { whitelist_only: true, ..free_round(280, 1) };
    let (first, second) = {
        let fx = open(&config);
        let first = fx.launchpad.create_round(ADMIN, gated.clone()).expect("create");
        let second = fx.launchpad.create_round(ADMIN, free_round(10, 2)).expect("create");
        fx.launchpad.add_members(ADMIN, first, &[BUYER, buyer(1)]).expect("add");
        fx.launchpad.mint(MintRequest::new(first, BUYER, U256::ZERO)).expect("mint");
        (first, second)
    };

    let fx = open(&config);
    assert_eq!(fx.launchpad.round_ids(), vec![first, second]);
    let round = fx.launchpad.get_round(first).expect("round");
    assert_eq!(round.config, gated);
    assert_eq!(round.state.minted_total, 1);
    assert!(fx.launchpad.is_whitelisted(first, &buyer(1)));

    // Caps and ids carry over.
    assert!(matches!(
        fx.launchpad.mint(MintRequest::new(first, BUYER, U256::ZERO)),
        Err(LaunchpadError::WalletCapExceeded { .. })
    ));
    fx.launchpad.mint(MintRequest::new(first, buyer(1), U256::ZERO)).expect("mint after reopen");
    assert_eq!(fx.launchpad.create_round(ADMIN, free_round(1, 1)).expect("create"), second + 1);
}

#[test]
fn manual_checkpoint_without_write_through() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("launchpad.json");
    let mut config = LaunchpadConfig::new(ADMIN).with_snapshot_path(&path);
    config.checkpoint_on_write = false;

    let fx = open(&config);
    let id = fx.launchpad.create_round(ADMIN, free_round(10, 1)).expect("create");
    assert!(!path.exists(), "nothing written before an explicit checkpoint");

    fx.launchpad.checkpoint().expect("checkpoint");
    let snapshot = FileSnapshotStore::new(&path).load().expect("load").expect("snapshot");
    assert_eq!(snapshot, fx.launchpad.snapshot());
    assert!(snapshot.rounds.contains_key(&id));
}

#[test]
fn in_memory_checkpoint_is_a_no_op() {
    let fx = Fixture::new();
    fx.launchpad.create_round(ADMIN, free_round(10, 1)).expect("create");
    fx.launchpad.checkpoint().expect("checkpoint");
}

#[test]
fn failed_write_through_does_not_fail_the_operation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"occupied").expect("write blocker");
    let config = LaunchpadConfig::new(ADMIN).with_snapshot_path(blocker.join("launchpad.json"));

    let fx = open(&config);
    let id = fx.launchpad.create_round(ADMIN, free_round(10, 1)).expect("create still succeeds");
    fx.launchpad.mint(MintRequest::new(id, BUYER, U256::ZERO)).expect("mint still succeeds");

    assert_eq!(fx.launchpad.get_round(id).expect("round").state.minted_total, 1);
    assert!(!fx.launchpad.checkpoint_healthy(), "lost durability is visible");
    assert!(fx.launchpad.checkpoint().is_err());
}

#[test]
fn corrupt_snapshot_refuses_to_open() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("launchpad.json");
    std::fs::write(&path, "not json").expect("write");

    let result = Launchpad::open(
        &LaunchpadConfig::new(ADMIN).with_snapshot_path(&path),
        InMemoryCollection::new(),
        InMemoryLedger::new(),
    );
    assert!(result.is_err());
}

fn open_saved(snapshot: &LaunchpadSnapshot) -> Result<(), SnapshotError> {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("launchpad.json");
    std::fs::write(&path, serde_json::to_string(snapshot).expect("encode")).expect("write");

    Launchpad::open(
        &LaunchpadConfig::new(ADMIN).with_snapshot_path(&path),
        InMemoryCollection::new(),
        InMemoryLedger::new(),
    )
    .map(|_| ())
}

#[test]
fn snapshot_from_other_version_refuses_to_open() {
    let snapshot = LaunchpadSnapshot { version: SNAPSHOT_VERSION + 98, ..Default::default() };

    assert!(matches!(
        open_saved(&snapshot),
        Err(SnapshotError::UnsupportedVersion { found, .. }) if found == SNAPSHOT_VERSION + 98
    ));
}

#[test]
fn snapshot_with_inconsistent_round_refuses_to_open() {
    let mut overminted = Round::new(free_round(1, 1));
    overminted.state.minted_total = 2;
    overminted.state.minted_by_wallet.insert(BUYER, 1);
    overminted.state.minted_by_wallet.insert(buyer(1), 1);
    let snapshot = LaunchpadSnapshot {
        next_round_id: 1,
        rounds: [(0, overminted)].into(),
        ..Default::default()
    };

    assert!(matches!(open_saved(&snapshot), Err(SnapshotError::InvalidRound { round_id: 0, .. })));
}

#[test]
fn snapshot_with_last_round_id_refuses_to_open() {
    let snapshot = LaunchpadSnapshot {
        next_round_id: 0,
        rounds: [(u64::MAX, Round::new(free_round(1, 1)))].into(),
        ..Default::default()
    };

    assert!(matches!(
        open_saved(&snapshot),
        Err(SnapshotError::InvalidRound { round_id: u64::MAX, .. })
    ));
}
