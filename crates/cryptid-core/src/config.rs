//! Configuration structures for cryptid-core.
//!
//! The core crate does not read environment variables or files. Program ids
//! and limits are passed explicitly by the caller; the CLI owns persistence.

use solana_program::pubkey::Pubkey;

use crate::constants::{
    CRYPTID_PROGRAM_ID, MAX_ACCOUNTS, MAX_TRANSACTION_SIZE, SOL_DID_PROGRAM_ID, SYSTEM_PROGRAM_ID,
};
use crate::errors::{CryptidError, CryptidResult};

/// Global configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CryptidConfig {
    pub programs: ProgramIds,
    pub limits: LimitsConfig,
}

/// Program ids the builder addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramIds {
    pub cryptid: Pubkey,
    pub did: Pubkey,
    pub system: Pubkey,
}

impl Default for ProgramIds {
    fn default() -> Self {
        Self {
            cryptid: CRYPTID_PROGRAM_ID,
            did: SOL_DID_PROGRAM_ID,
            system: SYSTEM_PROGRAM_ID,
        }
    }
}

/// Size limits used for validation and the direct-execution decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitsConfig {
    /// Upper bound on accounts array entries; never above the index width.
    pub max_accounts: usize,
    /// Serialized transaction budget for direct execution.
    pub max_transaction_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_accounts: MAX_ACCOUNTS,
            max_transaction_size: MAX_TRANSACTION_SIZE,
        }
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &CryptidConfig) -> CryptidResult<()> {
    if cfg.limits.max_accounts == 0 {
        return Err(CryptidError::invalid_argument(
            "max_accounts must be greater than zero",
        ));
    }

    if cfg.limits.max_accounts > MAX_ACCOUNTS {
        return Err(CryptidError::invalid_argument(format!(
            "max_accounts must not exceed {MAX_ACCOUNTS} (one-byte account indices)"
        )));
    }

    if cfg.limits.max_transaction_size == 0 {
        return Err(CryptidError::invalid_argument(
            "max_transaction_size must be greater than zero",
        ));
    }

    if cfg.programs.cryptid == cfg.programs.did {
        return Err(CryptidError::invalid_argument(
            "cryptid and did program ids must differ",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        validate_config(&CryptidConfig::default()).unwrap();
    }

    #[test]
    fn oversized_index_width_detected() {
        let mut cfg = CryptidConfig::default();
        cfg.limits.max_accounts = MAX_ACCOUNTS + 1;
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn zero_limits_detected() {
        let mut cfg = CryptidConfig::default();
        cfg.limits.max_transaction_size = 0;
        assert!(validate_config(&cfg).is_err());
    }
}
