//! PDA derivation helpers for the Cryptid and sol-did programs.
//!
//! These helpers implement deterministic address derivation and are designed to
//! match the on-chain programs' seeds. No network access is involved.

use solana_program::pubkey::Pubkey;

use crate::config::ProgramIds;
use crate::constants::{
    MAX_SEED_LEN, SEED_CRYPTID_ACCOUNT, SEED_CRYPTID_SIGNER, SEED_DID_ACCOUNT, SEED_TRANSACTION,
};
use crate::did::Did;
use crate::errors::{CryptidError, CryptidResult};

/// Every address a Cryptid account needs, derived once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptidAccount {
    pub did: Did,
    pub index: u32,
    pub did_account: Pubkey,
    pub address: Pubkey,
    pub bump: u8,
    pub signer: Pubkey,
    pub signer_bump: u8,
}

impl CryptidAccount {
    /// Derive the Cryptid account for `did`. `None` selects the default
    /// account (index 0), which exists without a creation transaction.
    pub fn derive(programs: &ProgramIds, did: Did, index: Option<u32>) -> CryptidResult<Self> {
        let index = index.unwrap_or_default();
        let (did_account, _) = did_account_address(&programs.did, &did)?;
        let (address, bump) = cryptid_account_address(programs, &did_account, index)?;
        let (signer, signer_bump) = cryptid_signer_address(&programs.cryptid, &address)?;
        Ok(Self {
            did,
            index,
            did_account,
            address,
            bump,
            signer,
            signer_bump,
        })
    }

    /// Same as [`CryptidAccount::derive`] from a DID string.
    pub fn from_did_str(programs: &ProgramIds, did: &str, index: Option<u32>) -> CryptidResult<Self> {
        Self::derive(programs, Did::parse(did)?, index)
    }

    /// Proposal account for `seed` under this Cryptid account.
    pub fn transaction_account(&self, cryptid_program: &Pubkey, seed: &str) -> CryptidResult<Pubkey> {
        transaction_account_address(cryptid_program, &self.address, seed).map(|(key, _)| key)
    }
}

/// Derive the sol-did account of a DID.
pub fn did_account_address(did_program: &Pubkey, did: &Did) -> CryptidResult<(Pubkey, u8)> {
    find(
        &[SEED_DID_ACCOUNT, did.authority.as_ref()],
        did_program,
        "did account",
    )
}

/// Derive a Cryptid account address from the DID account and account index.
pub fn cryptid_account_address(
    programs: &ProgramIds,
    did_account: &Pubkey,
    index: u32,
) -> CryptidResult<(Pubkey, u8)> {
    find(
        &[
            SEED_CRYPTID_ACCOUNT,
            programs.did.as_ref(),
            did_account.as_ref(),
            &index.to_le_bytes(),
        ],
        &programs.cryptid,
        "cryptid account",
    )
}

/// Derive the authority that signs on behalf of a Cryptid account.
pub fn cryptid_signer_address(
    cryptid_program: &Pubkey,
    cryptid_account: &Pubkey,
) -> CryptidResult<(Pubkey, u8)> {
    find(
        &[SEED_CRYPTID_SIGNER, cryptid_account.as_ref()],
        cryptid_program,
        "cryptid signer",
    )
}

/// Derive a proposal account from the Cryptid account and a caller-chosen
/// seed. Reusing a seed targets an already-initialized account.
pub fn transaction_account_address(
    cryptid_program: &Pubkey,
    cryptid_account: &Pubkey,
    seed: &str,
) -> CryptidResult<(Pubkey, u8)> {
    validate_seed(seed)?;
    find(
        &[SEED_TRANSACTION, cryptid_account.as_ref(), seed.as_bytes()],
        cryptid_program,
        "transaction account",
    )
}

/// Transaction seeds become a raw PDA seed, so the runtime's per-seed limit
/// applies.
pub fn validate_seed(seed: &str) -> CryptidResult<()> {
    if seed.is_empty() {
        return Err(CryptidError::invalid_argument("transaction seed is empty"));
    }
    if seed.len() > MAX_SEED_LEN {
        return Err(CryptidError::invalid_argument(format!(
            "transaction seed is {} bytes, max is {MAX_SEED_LEN}",
            seed.len()
        )));
    }
    Ok(())
}

fn find(seeds: &[&[u8]], program_id: &Pubkey, what: &'static str) -> CryptidResult<(Pubkey, u8)> {
    Pubkey::try_find_program_address(seeds, program_id)
        .ok_or(CryptidError::AddressDerivationExhausted(what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::did::Cluster;

    fn did() -> Did {
        Did::from_authority(Pubkey::new_unique(), Cluster::Localnet)
    }

    #[test]
    fn derivation_is_deterministic() {
        let programs = ProgramIds::default();
        let d = did();
        let a = CryptidAccount::derive(&programs, d, Some(3)).unwrap();
        let b = CryptidAccount::derive(&programs, d, Some(3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn index_changes_address() {
        let programs = ProgramIds::default();
        let d = did();
        let a = CryptidAccount::derive(&programs, d, Some(0)).unwrap();
        let b = CryptidAccount::derive(&programs, d, Some(1)).unwrap();
        assert_ne!(a.address, b.address);
        assert_ne!(a.signer, b.signer);
        assert_eq!(a.did_account, b.did_account);
    }

    #[test]
    fn default_index_is_zero() {
        let programs = ProgramIds::default();
        let d = did();
        let a = CryptidAccount::derive(&programs, d, None).unwrap();
        let b = CryptidAccount::derive(&programs, d, Some(0)).unwrap();
        assert_eq!(a.address, b.address);
        assert_eq!(a.index, 0);
    }

    #[test]
    fn cluster_does_not_affect_address() {
        let programs = ProgramIds::default();
        let key = Pubkey::new_unique();
        let a = CryptidAccount::derive(&programs, Did::from_authority(key, Cluster::Devnet), None).unwrap();
        let b = CryptidAccount::derive(&programs, Did::from_authority(key, Cluster::MainnetBeta), None).unwrap();
        assert_eq!(a.address, b.address);
    }

    #[test]
    fn transaction_seed_rules() {
        let programs = ProgramIds::default();
        let account = Pubkey::new_unique();
        let (a, _) = transaction_account_address(&programs.cryptid, &account, "seed-1").unwrap();
        let (b, _) = transaction_account_address(&programs.cryptid, &account, "seed-1").unwrap();
        let (c, _) = transaction_account_address(&programs.cryptid, &account, "seed-2").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);

        assert!(transaction_account_address(&programs.cryptid, &account, "").is_err());
        assert!(transaction_account_address(&programs.cryptid, &account, &"x".repeat(33)).is_err());
    }

    #[test]
    fn malformed_did_string_fails() {
        let programs = ProgramIds::default();
        assert!(CryptidAccount::from_did_str(&programs, "did:sol:nope", None).is_err());
    }
}
