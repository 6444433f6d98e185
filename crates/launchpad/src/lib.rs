//! # Evolve Launchpad
//!
//! Round-based sale and issuance of unique items. An admin configures
//! rounds, each with a price, a supply cap, a per-wallet cap, a time window
//! and an optional whitelist gate. Buyers mint one unit at a time; the engine
//! admits or rejects each request, moves payment to the round's beneficiary
//! and asks the item contract to issue the unit.
//!
//! ## Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | Round configuration and counters, one lock per round |
//! | [`whitelist`] | Per-round membership sets |
//! | [`engine`] | Admission checks, payment, issuance and commit |
//! | [`gateway`] | Ports to the ledger: [`ItemIssuer`] and [`PaymentGateway`] |
//! | [`events`] | Lifecycle notifications and sinks |
//! | [`snapshot`] | JSON snapshots for restart |
//!
//! ## Guarantees
//!
//! - Every mutating operator call is checked against the admin address first
//! - A rejected or failed mint leaves counters, balances and issuance untouched
//! - Concurrent mints on one round are serialized, so caps are never exceeded
//! - Updating a round keeps its minted counts
//!
//! ## Example
//!
//! ```
//! use alloy_primitives::{address, U256};
//! use ev_launchpad::{
//!     InMemoryCollection, InMemoryLedger, Launchpad, MintRequest, RoundConfig,
//! };
//!
//! let admin = address!("0x00000000000000000000000000000000000000a1");
//! let buyer = address!("0x00000000000000000000000000000000000000d1");
//! let launchpad = Launchpad::new(admin, InMemoryCollection::new(), InMemoryLedger::new());
//!
//! let round_id = launchpad
//!     .create_round(
//!         admin,
//!         RoundConfig {
//!             item_contract: address!("0x00000000000000000000000000000000000000c1"),
//!             beneficiary: admin,
//!             unit_price: U256::ZERO,
//!             supply_cap: 280,
//!             max_per_wallet: 1,
//!             start_time: 0,
//!             end_time: u64::MAX,
//!             whitelist_only: false,
//!         },
//!     )
//!     .unwrap();
//!
//! let receipt = launchpad.mint(MintRequest::new(round_id, buyer, U256::ZERO)).unwrap();
//! assert_eq!(receipt.minted_total, 1);
//! ```

pub mod auth;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod gateway;
pub mod memory;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod whitelist;

pub use auth::AdminGate;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::LaunchpadConfig;
pub use engine::{Launchpad, UNITS_PER_MINT};
pub use error::{IssuanceError, LaunchpadError, PaymentError, SnapshotError};
pub use events::{EventLog, EventSink, FanoutSink, LaunchpadEvent, LoggedEvent, TracingEventSink};
pub use gateway::{ItemIssuer, PaymentGateway, PaymentReceipt};
pub use memory::{InMemoryCollection, InMemoryLedger};
pub use snapshot::{FileSnapshotStore, LaunchpadSnapshot, SNAPSHOT_VERSION};
pub use store::RoundStore;
pub use types::{MintReceipt, MintRequest, Round, RoundConfig, RoundId, RoundState, UnitId};
pub use whitelist::WhitelistRegistry;
