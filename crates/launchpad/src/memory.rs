//! In-process ledger and item contracts.
//!
//! Used when the engine runs outside a chain (tests, simulations, local
//! tooling). Both types are thread-safe and can be shared with the engine
//! through an [`Arc`](std::sync::Arc) while remaining inspectable.

use alloy_primitives::{Address, U256};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    error::{IssuanceError, PaymentError},
    gateway::{ItemIssuer, PaymentGateway, PaymentReceipt},
    types::UnitId,
};

#[derive(Debug, Default)]
struct LedgerInner {
    balances: BTreeMap<Address, U256>,
    transfers: BTreeMap<u64, PaymentReceipt>,
    next_id: u64,
    rejected: BTreeSet<Address>,
    refuse_reversals: bool,
}

/// Native-balance ledger implementing [`PaymentGateway`].
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    inner: Mutex<LedgerInner>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance of `address`.
    pub fn balance_of(&self, address: &Address) -> U256 {
        self.inner.lock().balances.get(address).copied().unwrap_or_default()
    }

    /// Makes every subsequent transfer to `address` fail.
    pub fn reject_transfers_to(&self, address: Address) {
        self.inner.lock().rejected.insert(address);
    }

    /// Lifts a rejection set by [`Self::reject_transfers_to`].
    pub fn accept_transfers_to(&self, address: &Address) {
        self.inner.lock().rejected.remove(address);
    }

    /// Makes subsequent reversals fail while `refuse` is set.
    pub fn refuse_reversals(&self, refuse: bool) {
        self.inner.lock().refuse_reversals = refuse;
    }

    /// Number of completed, unreversed transfers.
    pub fn transfer_count(&self) -> usize {
        self.inner.lock().transfers.len()
    }
}

impl PaymentGateway for InMemoryLedger {
    fn pay(&self, beneficiary: Address, amount: U256) -> Result<PaymentReceipt, PaymentError> {
        let mut inner = self.inner.lock();
        if inner.rejected.contains(&beneficiary) {
            return Err(PaymentError::Rejected { beneficiary, amount });
        }

        let balance = inner.balances.get(&beneficiary).copied().unwrap_or_default();
        let new_balance =
            balance.checked_add(amount).ok_or(PaymentError::Overflow(beneficiary))?;
        inner.balances.insert(beneficiary, new_balance);

        let receipt = PaymentReceipt { id: inner.next_id, beneficiary, amount };
        inner.next_id += 1;
        inner.transfers.insert(receipt.id, receipt);
        Ok(receipt)
    }

    fn reverse(&self, receipt: &PaymentReceipt) -> Result<(), PaymentError> {
        let mut inner = self.inner.lock();
        if inner.refuse_reversals {
            return Err(PaymentError::ReversalRefused(receipt.id));
        }
        let transfer =
            inner.transfers.remove(&receipt.id).ok_or(PaymentError::UnknownReceipt(receipt.id))?;
        if let Some(balance) = inner.balances.get_mut(&transfer.beneficiary) {
            *balance = balance.saturating_sub(transfer.amount);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Collection {
    next_unit: u64,
    max_supply: Option<u64>,
    halted: bool,
    owners: BTreeMap<UnitId, Address>,
    balances: BTreeMap<Address, u64>,
}

/// Set of item contracts implementing [`ItemIssuer`].
///
/// Unknown contracts are created on first issuance with unlimited supply.
#[derive(Debug, Default)]
pub struct InMemoryCollection {
    contracts: Mutex<BTreeMap<Address, Collection>>,
}

impl InMemoryCollection {
    /// Creates an empty set of contracts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps how many units `contract` can ever issue.
    pub fn set_max_supply(&self, contract: Address, max_supply: u64) {
        self.contracts.lock().entry(contract).or_default().max_supply = Some(max_supply);
    }

    /// Makes `contract` refuse issuance until resumed.
    pub fn halt(&self, contract: Address) {
        self.contracts.lock().entry(contract).or_default().halted = true;
    }

    /// Lets a halted `contract` issue again.
    pub fn resume(&self, contract: Address) {
        self.contracts.lock().entry(contract).or_default().halted = false;
    }

    /// Units of `contract` held by `owner`.
    pub fn balance_of(&self, contract: &Address, owner: &Address) -> u64 {
        self.contracts
            .lock()
            .get(contract)
            .and_then(|collection| collection.balances.get(owner).copied())
            .unwrap_or_default()
    }

    /// Holder of a unit, if it was issued.
    pub fn owner_of(&self, contract: &Address, unit_id: &UnitId) -> Option<Address> {
        self.contracts.lock().get(contract).and_then(|collection| collection.owners.get(unit_id).copied())
    }

    /// Units issued by `contract` so far.
    pub fn total_issued(&self, contract: &Address) -> u64 {
        self.contracts.lock().get(contract).map(|collection| collection.next_unit).unwrap_or_default()
    }
}

impl ItemIssuer for InMemoryCollection {
    fn issue(&self, item_contract: Address, buyer: Address) -> Result<UnitId, IssuanceError> {
        if buyer.is_zero() {
            return Err(IssuanceError::new(item_contract, "cannot issue to zero address"));
        }

        let mut contracts = self.contracts.lock();
        let collection = contracts.entry(item_contract).or_default();
        if collection.halted {
            return Err(IssuanceError::new(item_contract, "issuance halted"));
        }
        if collection.max_supply.is_some_and(|max| collection.next_unit >= max) {
            return Err(IssuanceError::new(item_contract, "max supply reached"));
        }

        let unit_id = U256::from(collection.next_unit);
        collection.next_unit += 1;
        collection.owners.insert(unit_id, buyer);
        *collection.balances.entry(buyer).or_default() += 1;
        Ok(unit_id)
    }
}
