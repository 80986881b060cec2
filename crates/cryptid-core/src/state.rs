//! Proposal account image.
//!
//! This is the byte image the Cryptid program keeps in a proposal account.
//! The client never writes it directly; it is modelled here so that account
//! sizing can be checked against a real encoder and so that fetched accounts
//! can be inspected.

use bytes::{Buf, BufMut};
use solana_program::pubkey::Pubkey;

use crate::codec::{
    get_i64, get_len, get_pubkey, get_pubkeys, get_u16, get_u8, put_len, put_pubkeys,
    read_instructions, write_instructions, InstructionData,
};
use crate::errors::{CryptidError, CryptidResult};
use crate::size::{calculate_size, InstructionSize};

/// Leading byte of a proposal account.
pub const TRANSACTION_ACCOUNT_DISCRIMINANT: u8 = 0xC7;

/// When a signer's approval stops counting.
///
/// `Never` is written as `0` on the wire. `At` holds unix seconds and must
/// be positive so that it can never collide with the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Expiry {
    #[default]
    Never,
    At(i64),
}

impl Expiry {
    pub const NEVER_SENTINEL: i64 = 0;

    pub fn validate(&self) -> CryptidResult<()> {
        match self {
            Self::At(t) if *t <= Self::NEVER_SENTINEL => Err(CryptidError::invalid_argument(
                format!("expiry must be a positive unix timestamp, got {t}"),
            )),
            _ => Ok(()),
        }
    }

    pub fn to_wire(self) -> i64 {
        match self {
            Self::Never => Self::NEVER_SENTINEL,
            Self::At(t) => t,
        }
    }

    pub fn from_wire(value: i64) -> Self {
        if value == Self::NEVER_SENTINEL {
            Self::Never
        } else {
            Self::At(value)
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        match self {
            Self::Never => false,
            Self::At(t) => now > *t,
        }
    }
}

/// Lifecycle tag stored in the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TransactionState {
    /// Proposed, awaiting approvals.
    NotReady = 0,
    /// Approved; can be executed.
    Ready = 1,
    Executed = 2,
    Expired = 3,
}

impl TransactionState {
    pub fn from_u8(v: u8) -> CryptidResult<Self> {
        match v {
            0 => Ok(Self::NotReady),
            1 => Ok(Self::Ready),
            2 => Ok(Self::Executed),
            3 => Ok(Self::Expired),
            other => Err(CryptidError::invalid_argument(format!(
                "unknown transaction state {other}"
            ))),
        }
    }
}

/// A signer recorded on the proposal together with its middleware extras.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerEntry {
    pub key: Pubkey,
    pub extras: Vec<Pubkey>,
    pub expiry: Expiry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionAccountImage {
    pub cryptid_account: Pubkey,
    pub accounts: Vec<Pubkey>,
    pub instructions: Vec<InstructionData>,
    pub signers: Vec<SignerEntry>,
    pub state: TransactionState,
    pub settings_sequence: u16,
}

impl TransactionAccountImage {
    /// Size computed by the calculator for this image's contents.
    pub fn required_size(&self) -> usize {
        calculate_size(
            self.accounts.len(),
            &InstructionSize::all(&self.instructions),
            &self.signers.iter().map(|s| s.extras.len()).collect::<Vec<_>>(),
        )
    }

    pub fn write<B: BufMut>(&self, buf: &mut B) -> CryptidResult<()> {
        buf.put_u8(TRANSACTION_ACCOUNT_DISCRIMINANT);
        buf.put_slice(self.cryptid_account.as_ref());
        put_pubkeys(buf, &self.accounts)?;
        write_instructions(buf, &self.instructions)?;
        put_len(buf, self.signers.len())?;
        for signer in &self.signers {
            buf.put_slice(signer.key.as_ref());
            put_pubkeys(buf, &signer.extras)?;
            buf.put_i64_le(signer.expiry.to_wire());
        }
        buf.put_u8(self.state as u8);
        buf.put_u16_le(self.settings_sequence);
        Ok(())
    }

    pub fn encode(&self) -> CryptidResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.required_size());
        self.write(&mut out)?;
        Ok(out)
    }

    /// Decode an account's data. Trailing zero padding (over-allocation) is
    /// tolerated; anything else after the image is rejected.
    pub fn decode(bytes: &[u8]) -> CryptidResult<Self> {
        let mut buf = bytes;
        let disc = get_u8(&mut buf)?;
        if disc != TRANSACTION_ACCOUNT_DISCRIMINANT {
            return Err(CryptidError::UnknownDiscriminant(disc));
        }
        let cryptid_account = get_pubkey(&mut buf)?;
        let accounts = get_pubkeys(&mut buf)?;
        let instructions = read_instructions(&mut buf)?;

        let count = get_len(&mut buf)?;
        let mut signers = Vec::with_capacity(count.min(buf.remaining() / 44));
        for _ in 0..count {
            signers.push(SignerEntry {
                key: get_pubkey(&mut buf)?,
                extras: get_pubkeys(&mut buf)?,
                expiry: Expiry::from_wire(get_i64(&mut buf)?),
            });
        }

        let state = TransactionState::from_u8(get_u8(&mut buf)?)?;
        let settings_sequence = get_u16(&mut buf)?;

        if buf.iter().any(|b| *b != 0) {
            return Err(CryptidError::TrailingData(buf.remaining()));
        }

        Ok(Self {
            cryptid_account,
            accounts,
            instructions,
            signers,
            state,
            settings_sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::AbbreviatedAccountMeta;
    use assert_matches::assert_matches;

    fn image() -> TransactionAccountImage {
        TransactionAccountImage {
            cryptid_account: Pubkey::new_unique(),
            accounts: vec![Pubkey::new_unique(), Pubkey::new_unique()],
            instructions: vec![InstructionData {
                program_id: 0,
                accounts: vec![AbbreviatedAccountMeta { key: 1, meta: 2 }],
                data: vec![1, 2, 3, 4],
            }],
            signers: vec![
                SignerEntry {
                    key: Pubkey::new_unique(),
                    extras: vec![Pubkey::new_unique(), Pubkey::new_unique()],
                    expiry: Expiry::At(1_700_000_000),
                },
                SignerEntry {
                    key: Pubkey::new_unique(),
                    extras: vec![],
                    expiry: Expiry::Never,
                },
            ],
            state: TransactionState::NotReady,
            settings_sequence: 7,
        }
    }

    #[test]
    fn encoded_length_matches_calculator() {
        let img = image();
        assert_eq!(img.encode().unwrap().len(), img.required_size());
    }

    #[test]
    fn decode_reads_back_image_with_padding() {
        let img = image();
        let mut bytes = img.encode().unwrap();
        bytes.extend_from_slice(&[0; 16]);
        assert_eq!(TransactionAccountImage::decode(&bytes).unwrap(), img);
    }

    #[test]
    fn wrong_discriminant() {
        let mut bytes = image().encode().unwrap();
        bytes[0] = 0;
        assert_matches!(
            TransactionAccountImage::decode(&bytes),
            Err(CryptidError::UnknownDiscriminant(0))
        );
    }

    #[test]
    fn expiry_sentinel() {
        assert_eq!(Expiry::Never.to_wire(), 0);
        assert_eq!(Expiry::from_wire(0), Expiry::Never);
        assert_eq!(Expiry::from_wire(5), Expiry::At(5));
        assert!(Expiry::At(0).validate().is_err());
        assert!(Expiry::At(10).is_expired(11));
        assert!(!Expiry::Never.is_expired(i64::MAX));
    }
}
