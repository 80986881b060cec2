use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::cmd::session::Session;
use crate::output;

#[derive(Debug, Serialize)]
pub struct AddressOut {
    pub did: String,
    pub index: u32,
    pub did_account: String,
    pub cryptid_account: String,
    pub bump: u8,
    pub signer: String,
    pub signer_bump: u8,
}

pub async fn run(config: &Path, did: Option<&str>, index: Option<u32>) -> Result<()> {
    let session = Session::load(config, did, index)?;
    let a = session.account;
    output::print(&AddressOut {
        did: a.did.to_string(),
        index: a.index,
        did_account: a.did_account.to_string(),
        cryptid_account: a.address.to_string(),
        bump: a.bump,
        signer: a.signer.to_string(),
        signer_bump: a.signer_bump,
    })
}
