//! codec_properties.rs
//!
//! Property tests for the accounts array, the compact instruction codec and
//! the proposal account size calculator.

use std::collections::HashSet;

use cryptid_core::codec::{decode, encode, read_instructions, InstructionData};
use cryptid_core::prelude::*;
use cryptid_core::state::{SignerEntry, TransactionState};
use proptest::prelude::*;
use solana_program::instruction::{AccountMeta, Instruction};
use solana_program::pubkey::Pubkey;

/// Keys drawn from a small pool so that instructions share accounts.
fn key() -> impl Strategy<Value = Pubkey> {
    (0u8..24).prop_map(|b| Pubkey::new_from_array([b; 32]))
}

fn meta() -> impl Strategy<Value = AccountMeta> {
    (key(), any::<bool>(), any::<bool>()).prop_map(|(pubkey, is_signer, is_writable)| AccountMeta {
        pubkey,
        is_signer,
        is_writable,
    })
}

fn instruction() -> impl Strategy<Value = Instruction> {
    (
        key(),
        prop::collection::vec(meta(), 0..8),
        prop::collection::vec(any::<u8>(), 0..64),
    )
        .prop_map(|(program_id, accounts, data)| Instruction {
            program_id,
            accounts,
            data,
        })
}

proptest! {
    #[test]
    fn instructions_survive_the_codec(ixs in prop::collection::vec(instruction(), 1..6)) {
        let accounts = AccountsArray::from_instructions(&ixs).unwrap();
        for ix in &ixs {
            let bytes = encode(ix, &accounts).unwrap();
            prop_assert_eq!(&decode(&bytes, &accounts).unwrap(), ix);
        }
    }

    #[test]
    fn accounts_array_is_deduplicated(ixs in prop::collection::vec(instruction(), 0..6)) {
        let accounts = AccountsArray::from_instructions(&ixs).unwrap();
        let distinct: HashSet<Pubkey> = ixs
            .iter()
            .flat_map(|ix| std::iter::once(ix.program_id).chain(ix.accounts.iter().map(|m| m.pubkey)))
            .collect();
        prop_assert_eq!(accounts.len(), distinct.len());
        for key in &distinct {
            let i = accounts.index_of(key).unwrap();
            prop_assert_eq!(accounts.get(i).unwrap(), key);
        }
    }

    #[test]
    fn image_length_equals_calculated_size(
        ixs in prop::collection::vec(instruction(), 0..5),
        extras in prop::collection::vec(0usize..4, 0..4),
        sequence in any::<u16>(),
    ) {
        let accounts = AccountsArray::from_instructions(&ixs).unwrap();
        let instructions = ixs
            .iter()
            .map(|ix| InstructionData::from_instruction(ix, &accounts))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let image = TransactionAccountImage {
            cryptid_account: Pubkey::new_unique(),
            accounts: accounts.keys().to_vec(),
            instructions,
            signers: extras
                .iter()
                .map(|n| SignerEntry {
                    key: Pubkey::new_unique(),
                    extras: (0..*n).map(|_| Pubkey::new_unique()).collect(),
                    expiry: Expiry::Never,
                })
                .collect(),
            state: TransactionState::NotReady,
            settings_sequence: sequence,
        };
        let bytes = image.encode().unwrap();
        prop_assert_eq!(bytes.len(), image.required_size());
        prop_assert_eq!(TransactionAccountImage::decode(&bytes).unwrap(), image);
    }

    #[test]
    fn truncated_streams_never_decode(ix in instruction(), cut in 1usize..16) {
        let accounts = AccountsArray::from_instructions(std::slice::from_ref(&ix)).unwrap();
        let bytes = encode(&ix, &accounts).unwrap();
        let end = bytes.len().saturating_sub(cut);
        let mut buf = &bytes[..end];
        prop_assert!(InstructionData::read(&mut buf).is_err());
    }
}

#[test]
fn empty_instruction_list_decodes() {
    let mut buf: &[u8] = &[0, 0, 0, 0];
    assert!(read_instructions(&mut buf).unwrap().is_empty());
}

#[test]
fn size_of_two_signers_with_extras() {
    // one instruction: 2 accounts, 8 data bytes; signers with 2 and 0 extras
    let size = calculate_size(5, &[InstructionSize { accounts: 2, data_len: 8 }], &[2, 0]);
    let header = 1 + 32;
    let accounts = 4 + 5 * 32;
    let instructions = 4 + (1 + 4 + 2 * 2 + 4 + 8);
    let signers = 4 + (32 + 4 + 2 * 32 + 8) + (32 + 4 + 8);
    assert_eq!(size, header + accounts + instructions + signers + 1 + 2);
}
