//! Engine configuration
//!
//! Every economic and timing constant is a field here so a deployment can
//! override it. Missing fields fall back to the values in [`crate::constants`].

use crate::constants::{
    BUDDY_ONLY_SECONDS, CLAIM_GRACE_SECONDS, DEFAULT_GRACE_PERIOD,
    DEFAULT_SNOOZE_EXTENSION_SECONDS, DEFAULT_SNOOZE_PERCENT, EMERGENCY_REFUND_PENALTY_PERCENT,
    MAX_SNOOZE_COUNT, MIN_DEPOSIT_AMOUNT, SNOOZE_SHIFT_CAP, VAULT_RESERVE_FLOOR,
};
use crate::error::{Result, VaultError};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Snooze base cost, percent of the remaining deposit
    pub snooze_percent: u64,
    pub max_snooze_count: u8,
    /// How far one snooze pushes fire time and deadline
    pub snooze_extension_seconds: i64,
    pub min_deposit: u64,
    /// Emergency refund penalty, percent of the initial deposit
    pub refund_penalty_percent: u64,
    /// Deadline offset used when `create` is not given one
    pub default_grace_seconds: i64,
    pub claim_grace_seconds: i64,
    pub buddy_only_seconds: i64,
    pub vault_reserve_floor: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            snooze_percent: DEFAULT_SNOOZE_PERCENT,
            max_snooze_count: MAX_SNOOZE_COUNT,
            snooze_extension_seconds: DEFAULT_SNOOZE_EXTENSION_SECONDS,
            min_deposit: MIN_DEPOSIT_AMOUNT,
            refund_penalty_percent: EMERGENCY_REFUND_PENALTY_PERCENT,
            default_grace_seconds: DEFAULT_GRACE_PERIOD,
            claim_grace_seconds: CLAIM_GRACE_SECONDS,
            buddy_only_seconds: BUDDY_ONLY_SECONDS,
            vault_reserve_floor: VAULT_RESERVE_FLOOR,
        }
    }
}

impl VaultConfig {
    /// Parse a (possibly partial) JSON override and validate the result.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: VaultConfig =
            serde_json::from_str(json).map_err(|e| VaultError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.snooze_percent) {
            return Err(VaultError::Config(format!(
                "snooze_percent must be in 1..=100, got {}",
                self.snooze_percent
            )));
        }
        if !(1..=100).contains(&self.refund_penalty_percent) {
            return Err(VaultError::Config(format!(
                "refund_penalty_percent must be in 1..=100, got {}",
                self.refund_penalty_percent
            )));
        }
        if self.max_snooze_count == 0 || self.max_snooze_count > SNOOZE_SHIFT_CAP {
            return Err(VaultError::Config(format!(
                "max_snooze_count must be in 1..={SNOOZE_SHIFT_CAP}, got {}",
                self.max_snooze_count
            )));
        }
        if self.snooze_extension_seconds <= 0 {
            return Err(VaultError::Config(
                "snooze_extension_seconds must be positive".to_string(),
            ));
        }
        if self.default_grace_seconds <= 0 {
            return Err(VaultError::Config(
                "default_grace_seconds must be positive".to_string(),
            ));
        }
        if self.claim_grace_seconds < 0 || self.buddy_only_seconds < 0 {
            return Err(VaultError::Config(
                "claim_grace_seconds and buddy_only_seconds must not be negative".to_string(),
            ));
        }
        if self.min_deposit == 0 {
            return Err(VaultError::Config("min_deposit must be positive".to_string()));
        }
        Ok(())
    }
}
