use serde::Serialize;
use solana_sdk::instruction::Instruction;

#[derive(Debug, Clone, Serialize)]
pub struct AccountOut {
    pub pubkey: String,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// An instruction as printed by the CLI; data is hex.
#[derive(Debug, Clone, Serialize)]
pub struct InstructionOut {
    pub program_id: String,
    pub accounts: Vec<AccountOut>,
    pub data: String,
}

impl From<&Instruction> for InstructionOut {
    fn from(ix: &Instruction) -> Self {
        Self {
            program_id: ix.program_id.to_string(),
            accounts: ix
                .accounts
                .iter()
                .map(|m| AccountOut {
                    pubkey: m.pubkey.to_string(),
                    is_signer: m.is_signer,
                    is_writable: m.is_writable,
                })
                .collect(),
            data: hex::encode(&ix.data),
        }
    }
}

/// Instructions of one transaction, or its signature once sent.
#[derive(Debug, Clone, Serialize)]
pub struct TxPlan {
    pub instructions: Vec<InstructionOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl TxPlan {
    pub fn new(ixs: &[Instruction]) -> Self {
        Self {
            instructions: ixs.iter().map(InstructionOut::from).collect(),
            signature: None,
        }
    }

    pub fn describe(&self) -> String {
        if self.instructions.is_empty() {
            "no instructions".to_string()
        } else {
            format!("{} instruction(s)", self.instructions.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::instruction::AccountMeta;
    use solana_sdk::pubkey::Pubkey;

    #[test]
    fn data_is_hex() {
        let ix = Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[0xde, 0xad],
            vec![AccountMeta::new(Pubkey::new_unique(), true)],
        );
        let plan = TxPlan::new(&[ix]);
        assert_eq!(plan.instructions[0].data, "dead");
        assert!(plan.instructions[0].accounts[0].is_signer);
        assert_eq!(plan.describe(), "1 instruction(s)");
    }
}
