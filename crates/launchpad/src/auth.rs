//! Admin authorization for mutating entry points.

use alloy_primitives::Address;

use crate::error::LaunchpadError;

/// Identity check applied at the top of every mutating entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdminGate {
    admin: Address,
}

impl AdminGate {
    /// Creates a gate that admits only `admin`.
    pub const fn new(admin: Address) -> Self {
        Self { admin }
    }

    /// The admitted address.
    pub const fn admin(&self) -> Address {
        self.admin
    }

    /// Fails with [`LaunchpadError::Unauthorized`] unless `caller` is the admin.
    pub fn ensure_admin(&self, caller: Address) -> Result<(), LaunchpadError> {
        if caller == self.admin {
            Ok(())
        } else {
            tracing::warn!(target: "launchpad", ?caller, "authorization denied");
            Err(LaunchpadError::Unauthorized { caller })
        }
    }
}
