//! Cryptid program instruction payloads.
//!
//! Every payload starts with a one-byte discriminant followed by the
//! operation's fields. Nested instructions use the compact encoding from
//! [`crate::codec`]. Integers are little-endian and sequences carry a u32
//! length prefix, matching the program's decoder byte for byte.
//!
//! ```text
//! 0 Propose        signers[(extras u8, expiry i64)] account_size u32
//!                  accounts[Pubkey] instructions[..] ready_to_execute u8 seed str
//! 1 Approve        extras u8, expiry i64
//! 2 Execute        extras u8, flags u8
//! 3 Expire         extras u8
//! 4 DirectExecute  extras u8, instructions[..], flags u8
//! ```

use bytes::BufMut;
use solana_program::pubkey::Pubkey;

use crate::codec::{
    get_bool, get_bytes, get_i64, get_len, get_pubkeys, get_u32, get_u8, put_bytes, put_len,
    put_pubkeys, read_instructions, write_instructions, InstructionData,
};
use crate::errors::{CryptidError, CryptidResult};
use crate::state::Expiry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Discriminant {
    Propose = 0,
    Approve = 1,
    Execute = 2,
    Expire = 3,
    DirectExecute = 4,
}

impl TryFrom<u8> for Discriminant {
    type Error = CryptidError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Propose),
            1 => Ok(Self::Approve),
            2 => Ok(Self::Execute),
            3 => Ok(Self::Expire),
            4 => Ok(Self::DirectExecute),
            other => Err(CryptidError::UnknownDiscriminant(other)),
        }
    }
}

/// Extra flags passed to execution instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecuteFlags(pub u8);

impl ExecuteFlags {
    /// Program prints debug logs; uses a large share of the compute budget.
    pub const DEBUG: Self = Self(1 << 0);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Per-signer entry of a propose payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignerMeta {
    /// Number of middleware accounts following the signer in the account list.
    pub extras: u8,
    pub expiry: Expiry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptidInstruction {
    ProposeTransaction {
        signers: Vec<SignerMeta>,
        account_size: u32,
        accounts: Vec<Pubkey>,
        instructions: Vec<InstructionData>,
        ready_to_execute: bool,
        seed: String,
    },
    ApproveTransaction {
        signer_extras: u8,
        expiry: Expiry,
    },
    ExecuteTransaction {
        signer_extras: u8,
        flags: ExecuteFlags,
    },
    ExpireTransaction {
        signer_extras: u8,
    },
    DirectExecute {
        signer_extras: u8,
        instructions: Vec<InstructionData>,
        flags: ExecuteFlags,
    },
}

impl CryptidInstruction {
    pub fn discriminant(&self) -> Discriminant {
        match self {
            Self::ProposeTransaction { .. } => Discriminant::Propose,
            Self::ApproveTransaction { .. } => Discriminant::Approve,
            Self::ExecuteTransaction { .. } => Discriminant::Execute,
            Self::ExpireTransaction { .. } => Discriminant::Expire,
            Self::DirectExecute { .. } => Discriminant::DirectExecute,
        }
    }

    pub fn pack(&self) -> CryptidResult<Vec<u8>> {
        let mut out = vec![self.discriminant() as u8];
        match self {
            Self::ProposeTransaction {
                signers,
                account_size,
                accounts,
                instructions,
                ready_to_execute,
                seed,
            } => {
                put_len(&mut out, signers.len())?;
                for signer in signers {
                    signer.expiry.validate()?;
                    out.put_u8(signer.extras);
                    out.put_i64_le(signer.expiry.to_wire());
                }
                out.put_u32_le(*account_size);
                put_pubkeys(&mut out, accounts)?;
                write_instructions(&mut out, instructions)?;
                out.put_u8(u8::from(*ready_to_execute));
                put_bytes(&mut out, seed.as_bytes())?;
            }
            Self::ApproveTransaction {
                signer_extras,
                expiry,
            } => {
                expiry.validate()?;
                out.put_u8(*signer_extras);
                out.put_i64_le(expiry.to_wire());
            }
            Self::ExecuteTransaction {
                signer_extras,
                flags,
            } => {
                out.put_u8(*signer_extras);
                out.put_u8(flags.0);
            }
            Self::ExpireTransaction { signer_extras } => out.put_u8(*signer_extras),
            Self::DirectExecute {
                signer_extras,
                instructions,
                flags,
            } => {
                out.put_u8(*signer_extras);
                write_instructions(&mut out, instructions)?;
                out.put_u8(flags.0);
            }
        }
        Ok(out)
    }

    pub fn unpack(data: &[u8]) -> CryptidResult<Self> {
        let mut buf = data;
        let ix = match Discriminant::try_from(get_u8(&mut buf)?)? {
            Discriminant::Propose => {
                let count = get_len(&mut buf)?;
                let mut signers = Vec::with_capacity(count.min(buf.len() / 9));
                for _ in 0..count {
                    signers.push(SignerMeta {
                        extras: get_u8(&mut buf)?,
                        expiry: Expiry::from_wire(get_i64(&mut buf)?),
                    });
                }
                let account_size = get_u32(&mut buf)?;
                let accounts = get_pubkeys(&mut buf)?;
                let instructions = read_instructions(&mut buf)?;
                let ready_to_execute = get_bool(&mut buf)?;
                let seed = String::from_utf8(get_bytes(&mut buf)?)
                    .map_err(|_| CryptidError::invalid_argument("seed is not valid utf-8"))?;
                Self::ProposeTransaction {
                    signers,
                    account_size,
                    accounts,
                    instructions,
                    ready_to_execute,
                    seed,
                }
            }
            Discriminant::Approve => Self::ApproveTransaction {
                signer_extras: get_u8(&mut buf)?,
                expiry: Expiry::from_wire(get_i64(&mut buf)?),
            },
            Discriminant::Execute => Self::ExecuteTransaction {
                signer_extras: get_u8(&mut buf)?,
                flags: ExecuteFlags(get_u8(&mut buf)?),
            },
            Discriminant::Expire => Self::ExpireTransaction {
                signer_extras: get_u8(&mut buf)?,
            },
            Discriminant::DirectExecute => Self::DirectExecute {
                signer_extras: get_u8(&mut buf)?,
                instructions: read_instructions(&mut buf)?,
                flags: ExecuteFlags(get_u8(&mut buf)?),
            },
        };
        if !buf.is_empty() {
            return Err(CryptidError::TrailingData(buf.len()));
        }
        Ok(ix)
    }
}

/// Extras count of a signer as carried on the wire.
pub fn extras_count(n: usize) -> CryptidResult<u8> {
    u8::try_from(n).map_err(|_| {
        CryptidError::invalid_argument(format!("signer has {n} middleware accounts, max is 255"))
    })
}

pub fn propose_transaction(
    signers: Vec<SignerMeta>,
    account_size: usize,
    accounts: &[Pubkey],
    instructions: Vec<InstructionData>,
    ready_to_execute: bool,
    seed: &str,
) -> CryptidResult<Vec<u8>> {
    let account_size = u32::try_from(account_size).map_err(|_| {
        CryptidError::invalid_argument(format!("account size {account_size} exceeds u32"))
    })?;
    CryptidInstruction::ProposeTransaction {
        signers,
        account_size,
        accounts: accounts.to_vec(),
        instructions,
        ready_to_execute,
        seed: seed.to_string(),
    }
    .pack()
}

pub fn approve_transaction(signer_extras: u8, expiry: Expiry) -> CryptidResult<Vec<u8>> {
    CryptidInstruction::ApproveTransaction {
        signer_extras,
        expiry,
    }
    .pack()
}

pub fn execute_transaction(signer_extras: u8, flags: ExecuteFlags) -> CryptidResult<Vec<u8>> {
    CryptidInstruction::ExecuteTransaction {
        signer_extras,
        flags,
    }
    .pack()
}

pub fn expire_transaction(signer_extras: u8) -> CryptidResult<Vec<u8>> {
    CryptidInstruction::ExpireTransaction { signer_extras }.pack()
}

pub fn direct_execute(
    signer_extras: u8,
    instructions: Vec<InstructionData>,
    flags: ExecuteFlags,
) -> CryptidResult<Vec<u8>> {
    CryptidInstruction::DirectExecute {
        signer_extras,
        instructions,
        flags,
    }
    .pack()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::AbbreviatedAccountMeta;
    use assert_matches::assert_matches;

    fn propose() -> CryptidInstruction {
        CryptidInstruction::ProposeTransaction {
            signers: vec![
                SignerMeta { extras: 2, expiry: Expiry::At(1_800_000_000) },
                SignerMeta { extras: 0, expiry: Expiry::Never },
            ],
            account_size: 512,
            accounts: vec![Pubkey::new_unique(), Pubkey::new_unique()],
            instructions: vec![InstructionData {
                program_id: 1,
                accounts: vec![AbbreviatedAccountMeta { key: 0, meta: 3 }],
                data: vec![0xaa; 12],
            }],
            ready_to_execute: false,
            seed: "pay-rent".to_string(),
        }
    }

    #[test]
    fn propose_header_layout() {
        let bytes = propose().pack().unwrap();
        assert_eq!(bytes[0], Discriminant::Propose as u8);
        assert_eq!(&bytes[1..5], &2u32.to_le_bytes());
        assert_eq!(bytes[5], 2);
        assert_eq!(&bytes[6..14], &1_800_000_000i64.to_le_bytes());
        assert_eq!(bytes[14], 0);
        assert_eq!(&bytes[15..23], &0i64.to_le_bytes());
        assert_eq!(&bytes[23..27], &512u32.to_le_bytes());
        assert!(bytes.ends_with(b"pay-rent"));
    }

    #[test]
    fn unpack_reads_every_operation() {
        for ix in [
            propose(),
            CryptidInstruction::ApproveTransaction { signer_extras: 1, expiry: Expiry::At(99) },
            CryptidInstruction::ExecuteTransaction { signer_extras: 0, flags: ExecuteFlags::DEBUG },
            CryptidInstruction::ExpireTransaction { signer_extras: 3 },
            CryptidInstruction::DirectExecute {
                signer_extras: 0,
                instructions: vec![],
                flags: ExecuteFlags::default(),
            },
        ] {
            let bytes = ix.pack().unwrap();
            assert_eq!(CryptidInstruction::unpack(&bytes).unwrap(), ix);
        }
    }

    #[test]
    fn execute_payload_is_three_bytes() {
        let bytes = execute_transaction(2, ExecuteFlags::DEBUG).unwrap();
        assert_eq!(bytes, vec![2, 2, 1]);
    }

    #[test]
    fn unknown_discriminant() {
        assert_matches!(CryptidInstruction::unpack(&[9]), Err(CryptidError::UnknownDiscriminant(9)));
    }

    #[test]
    fn invalid_expiry_is_rejected_before_encoding() {
        assert!(approve_transaction(0, Expiry::At(-5)).is_err());
    }

    #[test]
    fn extras_count_bounds() {
        assert_eq!(extras_count(255).unwrap(), 255);
        assert!(extras_count(256).is_err());
    }
}
