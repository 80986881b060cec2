//! Time-delay middleware.
//!
//! A proposal gated by this middleware can only execute once a configured
//! delay has passed since it was registered. Registration is a separate
//! instruction that records the creation time in a PDA keyed by the
//! proposal account, so it must land before the proposal is executed.

use cryptid_core::constants::SYSTEM_PROGRAM_ID;
use cryptid_core::errors::CryptidResult;
use cryptid_core::middleware::{Middleware, MiddlewareRegistry, SignerContext};
use solana_program::instruction::{AccountMeta, Instruction};
use solana_program::pubkey;
use solana_program::pubkey::Pubkey;

use super::{anchor_discriminator, find_address, require};
use crate::spec::MiddlewareSpec;

pub const PROGRAM_ID: Pubkey = pubkey!("midttN2h6G2CBvt1kpnwUsFXM6Gv7gratVwuo2XhSNk");

pub const SEED_TRANSACTION_CREATE_TIME: &[u8] = b"transaction_create_time";

pub fn spec() -> MiddlewareSpec {
    MiddlewareSpec::new("time-delay", "Time delay", PROGRAM_ID)
        .extra_account("middleware account")
        .extra_account("transaction create time")
        .setup()
        .meta("requires", "proposal")
}

pub fn register(registry: &mut MiddlewareRegistry) {
    registry.register(PROGRAM_ID, Box::new(TimeDelay::default()));
}

pub fn transaction_create_time_address(program: &Pubkey, transaction_account: &Pubkey) -> CryptidResult<Pubkey> {
    find_address(
        &[SEED_TRANSACTION_CREATE_TIME, transaction_account.as_ref()],
        program,
        "transaction create time",
    )
}

#[derive(Debug, Clone)]
pub struct TimeDelay {
    program: Pubkey,
}

impl Default for TimeDelay {
    fn default() -> Self {
        Self { program: PROGRAM_ID }
    }
}

impl TimeDelay {
    fn accounts(&self, ctx: &SignerContext) -> CryptidResult<(Pubkey, Pubkey, Pubkey)> {
        let middleware = require(ctx.middleware_account, &self.program, "middleware account")?;
        let transaction = require(ctx.transaction_account, &self.program, "proposal account")?;
        let create_time = transaction_create_time_address(&self.program, &transaction)?;
        Ok((middleware, transaction, create_time))
    }
}

impl Middleware for TimeDelay {
    fn name(&self) -> &str {
        "time-delay"
    }

    fn extra_accounts(&self, ctx: &SignerContext) -> CryptidResult<Vec<AccountMeta>> {
        let (middleware, _, create_time) = self.accounts(ctx)?;
        Ok(vec![
            AccountMeta::new_readonly(middleware, false),
            AccountMeta::new_readonly(create_time, false),
        ])
    }

    fn setup_instruction(&self, ctx: &SignerContext) -> CryptidResult<Option<Instruction>> {
        let (middleware, transaction, create_time) = self.accounts(ctx)?;
        Ok(Some(Instruction {
            program_id: self.program,
            accounts: vec![
                AccountMeta::new_readonly(middleware, false),
                AccountMeta::new_readonly(transaction, false),
                AccountMeta::new(create_time, false),
                AccountMeta::new(ctx.signer, true),
                AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            ],
            data: anchor_discriminator("register_transaction").to_vec(),
        }))
    }
}
