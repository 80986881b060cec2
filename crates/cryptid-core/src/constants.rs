//! Constants shared between the on-chain programs and clients.
//!
//! Keep these stable because they affect PDA derivation and the wire format.

use solana_program::pubkey;
use solana_program::pubkey::Pubkey;

/// Cryptid program id.
pub const CRYPTID_PROGRAM_ID: Pubkey = pubkey!("cryptJTh61jY5kbUmBEXyc86tBUyueBDrLuNSZWmUcs");

/// sol-did program id.
pub const SOL_DID_PROGRAM_ID: Pubkey = pubkey!("didso1Dpqpm4CsiCjzP766BGY89CAdD6ZBL68cRhFPc");

/// System program id.
pub const SYSTEM_PROGRAM_ID: Pubkey = pubkey!("11111111111111111111111111111111");

/// PDA seed for Cryptid accounts.
pub const SEED_CRYPTID_ACCOUNT: &[u8] = b"cryptid_account";

/// PDA seed for the signing authority of a Cryptid account.
pub const SEED_CRYPTID_SIGNER: &[u8] = b"cryptid_signer";

/// PDA seed for proposal (transaction) accounts.
pub const SEED_TRANSACTION: &[u8] = b"transaction";

/// PDA seed for sol-did accounts.
pub const SEED_DID_ACCOUNT: &[u8] = b"did-account";

/// Longest seed accepted by the runtime for a single PDA seed.
pub const MAX_SEED_LEN: usize = 32;

/// Account indices are a single byte, so at most 256 addresses fit.
pub const MAX_ACCOUNTS: usize = u8::MAX as usize + 1;

/// Maximum serialized transaction size accepted by the network.
pub const MAX_TRANSACTION_SIZE: usize = 1232;

/// DID method prefix handled by this client.
pub const DID_SOL_PREFIX: &str = "did:sol:";
