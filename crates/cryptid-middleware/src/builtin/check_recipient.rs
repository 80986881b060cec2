//! Check-recipient middleware: transfers out of the Cryptid account may only
//! go to the recipient stored in the middleware account.

use cryptid_core::errors::CryptidResult;
use cryptid_core::middleware::{Middleware, MiddlewareRegistry, SignerContext};
use solana_program::instruction::AccountMeta;
use solana_program::pubkey;
use solana_program::pubkey::Pubkey;

use super::require;
use crate::spec::MiddlewareSpec;

pub const PROGRAM_ID: Pubkey = pubkey!("midcRt5CBHJ2T4LZbW2HUh4EVqGk7ZnLhAXkN4NVGvv");

pub fn spec() -> MiddlewareSpec {
    MiddlewareSpec::new("check-recipient", "Check recipient", PROGRAM_ID)
        .extra_account("middleware account")
}

pub fn register(registry: &mut MiddlewareRegistry) {
    registry.register(PROGRAM_ID, Box::new(CheckRecipient));
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CheckRecipient;

impl Middleware for CheckRecipient {
    fn name(&self) -> &str {
        "check-recipient"
    }

    fn extra_accounts(&self, ctx: &SignerContext) -> CryptidResult<Vec<AccountMeta>> {
        let middleware = require(ctx.middleware_account, &PROGRAM_ID, "middleware account")?;
        Ok(vec![AccountMeta::new_readonly(middleware, false)])
    }
}
