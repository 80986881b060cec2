use std::path::Path;

use anyhow::Result;
use cryptid_core::state::{Expiry, TransactionState};
use serde::Serialize;

use crate::cmd::session::Session;
use crate::output;

#[derive(Debug, Serialize)]
pub struct SignerOut {
    pub key: String,
    pub extras: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ShowOut {
    pub transaction_account: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signers: Vec<SignerOut>,
}

fn state_name(state: TransactionState) -> &'static str {
    match state {
        TransactionState::NotReady => "not-ready",
        TransactionState::Ready => "ready",
        TransactionState::Executed => "executed",
        TransactionState::Expired => "expired",
    }
}

pub async fn run(config: &Path, seed: &str) -> Result<()> {
    let session = Session::load(config, None, None)?;
    let key = session.builder().transaction_account(seed)?;
    let image = session.client().fetch_proposal(&key)?;

    let mut out = ShowOut {
        transaction_account: key.to_string(),
        exists: image.is_some(),
        state: None,
        accounts: Vec::new(),
        instructions: None,
        signers: Vec::new(),
    };
    if let Some(image) = image {
        out.state = Some(state_name(image.state));
        out.accounts = image.accounts.iter().map(|k| k.to_string()).collect();
        out.instructions = Some(image.instructions.len());
        out.signers = image
            .signers
            .iter()
            .map(|s| SignerOut {
                key: s.key.to_string(),
                extras: s.extras.iter().map(|k| k.to_string()).collect(),
                expires_at: match s.expiry {
                    Expiry::Never => None,
                    Expiry::At(t) => Some(t),
                },
            })
            .collect();
    }
    output::print(&out)
}
