use alloy_primitives::Address;
use std::{path::PathBuf, str::FromStr};

/// Environment variable holding the admin address.
pub const ENV_ADMIN: &str = "EV_LAUNCHPAD_ADMIN";
/// Environment variable holding the snapshot path.
pub const ENV_SNAPSHOT_PATH: &str = "EV_LAUNCHPAD_SNAPSHOT_PATH";
/// Environment variable enabling a checkpoint after every mutation.
pub const ENV_CHECKPOINT_ON_WRITE: &str = "EV_LAUNCHPAD_CHECKPOINT_ON_WRITE";

/// Configuration for a launchpad instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchpadConfig {
    /// The only address allowed to create/update rounds and edit whitelists.
    pub admin: Address,
    /// Where state snapshots are read from and written to.
    pub snapshot_path: Option<PathBuf>,
    /// Write a snapshot after every committed mutation.
    pub checkpoint_on_write: bool,
}

impl LaunchpadConfig {
    /// In-memory configuration administered by `admin`.
    pub const fn new(admin: Address) -> Self {
        Self { admin, snapshot_path: None, checkpoint_on_write: false }
    }

    /// Persists state at `path`, checkpointing after every mutation.
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self.checkpoint_on_write = true;
        self
    }

    /// Creates a new `LaunchpadConfig` from environment variables.
    pub fn from_env() -> eyre::Result<Self> {
        let admin = std::env::var(ENV_ADMIN).map(|s| Address::from_str(s.trim()))??;
        eyre::ensure!(!admin.is_zero(), "{ENV_ADMIN} cannot be the zero address");

        let snapshot_path = std::env::var(ENV_SNAPSHOT_PATH).ok().map(PathBuf::from);

        let checkpoint_on_write = std::env::var(ENV_CHECKPOINT_ON_WRITE)
            .ok()
            .map(|s| bool::from_str(s.trim()))
            .transpose()?
            .unwrap_or(snapshot_path.is_some());

        Ok(Self { admin, snapshot_path, checkpoint_on_write })
    }

    /// Check if the configuration is valid for production use
    pub fn is_production_ready(&self) -> bool {
        !self.admin.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn builder_enables_checkpoints_with_path() {
        let admin = address!("0x00000000000000000000000000000000000000a1");
        let config = LaunchpadConfig::new(admin).with_snapshot_path("/tmp/launchpad.json");

        assert_eq!(config.snapshot_path, Some(PathBuf::from("/tmp/launchpad.json")));
        assert!(config.checkpoint_on_write);
        assert!(config.is_production_ready());
        assert!(!LaunchpadConfig::new(Address::ZERO).is_production_ready());
    }
}
