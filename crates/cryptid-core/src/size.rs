//! Exact size of a proposal (transaction) account.
//!
//! The proposal account is allocated with this size at propose time and the
//! program then writes the account image ([`crate::state::TransactionAccountImage`])
//! into it. Under-allocation is rejected on-chain, over-allocation wastes
//! rent, so the arithmetic here tracks the codec field by field:
//!
//! ```text
//! 1                         discriminant
//! 32                        cryptid account
//! 4 + 32 * accounts         accounts array
//! 4 + sum(1 + 4 + 2a + 4 + d)   instructions
//! 4 + sum(32 + 4 + 32e + 8)     signers (key, extras, expiry)
//! 1                         state
//! 2                         settings sequence
//! ```

use crate::codec::{AbbreviatedAccountMeta, InstructionData};

/// Per-instruction input to [`calculate_size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionSize {
    pub accounts: usize,
    pub data_len: usize,
}

impl InstructionSize {
    pub fn of(ix: &InstructionData) -> Self {
        Self {
            accounts: ix.accounts.len(),
            data_len: ix.data.len(),
        }
    }

    pub fn all<'a>(ixs: impl IntoIterator<Item = &'a InstructionData>) -> Vec<Self> {
        ixs.into_iter().map(Self::of).collect()
    }

    fn encoded_len(&self) -> usize {
        1 + 4 + AbbreviatedAccountMeta::SIZE * self.accounts + 4 + self.data_len
    }
}

pub const DISCRIMINANT_SIZE: usize = 1;
pub const PUBKEY_SIZE: usize = 32;
pub const LEN_PREFIX_SIZE: usize = 4;
pub const EXPIRY_SIZE: usize = 8;
pub const STATE_SIZE: usize = 1;
pub const SETTINGS_SEQUENCE_SIZE: usize = 2;

/// Bytes one signer entry occupies.
pub fn signer_size(extras: usize) -> usize {
    PUBKEY_SIZE + LEN_PREFIX_SIZE + PUBKEY_SIZE * extras + EXPIRY_SIZE
}

/// Size of a proposal account holding `num_accounts` addresses, the given
/// instructions and one signer entry per element of `signer_extras`.
/// Empty instruction or signer lists contribute only their length prefix.
pub fn calculate_size(
    num_accounts: usize,
    instruction_sizes: &[InstructionSize],
    signer_extras: &[usize],
) -> usize {
    let instructions: usize = instruction_sizes.iter().map(InstructionSize::encoded_len).sum();
    let signers: usize = signer_extras.iter().copied().map(signer_size).sum();

    DISCRIMINANT_SIZE
        + PUBKEY_SIZE
        + LEN_PREFIX_SIZE
        + PUBKEY_SIZE * num_accounts
        + LEN_PREFIX_SIZE
        + instructions
        + LEN_PREFIX_SIZE
        + signers
        + STATE_SIZE
        + SETTINGS_SEQUENCE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_proposal_has_fixed_overhead() {
        assert_eq!(calculate_size(0, &[], &[]), 1 + 32 + 4 + 4 + 4 + 1 + 2);
    }

    #[test]
    fn signer_terms_for_mixed_extras() {
        let base = calculate_size(0, &[], &[]);
        let with_signers = calculate_size(0, &[], &[2, 0]);
        assert_eq!(with_signers - base, (32 + 4 + 32 * 2 + 8) + (32 + 4 + 8));
    }

    #[test]
    fn instruction_term() {
        let base = calculate_size(7, &[], &[0]);
        let with_ix = calculate_size(7, &[InstructionSize { accounts: 3, data_len: 10 }], &[0]);
        assert_eq!(with_ix - base, 1 + 4 + 6 + 4 + 10);
    }

    #[test]
    fn matches_codec_instruction_length() {
        let ix = InstructionData {
            program_id: 0,
            accounts: vec![AbbreviatedAccountMeta { key: 1, meta: 0 }; 5],
            data: vec![0; 17],
        };
        assert_eq!(InstructionSize::of(&ix).encoded_len(), ix.encoded_len());
    }
}
