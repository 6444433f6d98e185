//! Capabilities the engine consumes from the surrounding ledger.

use alloy_primitives::{Address, U256};
use std::sync::Arc;

use crate::{
    error::{IssuanceError, PaymentError},
    types::UnitId,
};

/// Issues units on an external item contract.
pub trait ItemIssuer: Send + Sync {
    /// Issues the next unit of `item_contract` to `buyer`.
    fn issue(&self, item_contract: Address, buyer: Address) -> Result<UnitId, IssuanceError>;
}

/// Proof of a completed transfer, used to reverse it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaymentReceipt {
    /// Ledger-assigned transfer id.
    pub id: u64,
    /// Credited address.
    pub beneficiary: Address,
    /// Transferred amount, in wei.
    pub amount: U256,
}

/// Atomic value transfer to a round's beneficiary.
///
/// `pay` either completes or leaves no effect. `reverse` undoes a completed
/// transfer when the surrounding mint cannot finish.
pub trait PaymentGateway: Send + Sync {
    /// Credits `amount` to `beneficiary`.
    fn pay(&self, beneficiary: Address, amount: U256) -> Result<PaymentReceipt, PaymentError>;

    /// Undoes the transfer behind `receipt`.
    fn reverse(&self, receipt: &PaymentReceipt) -> Result<(), PaymentError>;
}

impl<T: ItemIssuer + ?Sized> ItemIssuer for Arc<T> {
    fn issue(&self, item_contract: Address, buyer: Address) -> Result<UnitId, IssuanceError> {
        (**self).issue(item_contract, buyer)
    }
}

impl<T: PaymentGateway + ?Sized> PaymentGateway for Arc<T> {
    fn pay(&self, beneficiary: Address, amount: U256) -> Result<PaymentReceipt, PaymentError> {
        (**self).pay(beneficiary, amount)
    }

    fn reverse(&self, receipt: &PaymentReceipt) -> Result<(), PaymentError> {
        (**self).reverse(receipt)
    }
}
