//! Check-pass middleware: the signer must hold a valid gateway pass issued
//! on the configured gatekeeper network.

use cryptid_core::errors::CryptidResult;
use cryptid_core::middleware::{Middleware, MiddlewareRegistry, SignerContext};
use solana_program::instruction::AccountMeta;
use solana_program::pubkey;
use solana_program::pubkey::Pubkey;

use super::{find_address, require};
use crate::spec::MiddlewareSpec;

pub const PROGRAM_ID: Pubkey = pubkey!("midcHDoZsxvMmNtUr8howe8MWFrJeHHPbAyJF1nHvyf");

pub const GATEWAY_PROGRAM_ID: Pubkey = pubkey!("gatem74V238djXdzWnJf94Wo1DcnuGkfijbf3AuBhfs");

const SEED_GATEWAY: &[u8] = b"gateway";

pub fn spec() -> MiddlewareSpec {
    MiddlewareSpec::new("check-pass", "Check pass", PROGRAM_ID)
        .extra_account("middleware account")
        .extra_account("gateway token")
        .meta("gateway_program", GATEWAY_PROGRAM_ID.to_string())
}

pub fn register(registry: &mut MiddlewareRegistry, gatekeeper_network: Option<Pubkey>) {
    registry.register(PROGRAM_ID, Box::new(CheckPass::new(gatekeeper_network)));
}

/// Gateway token of `owner` on `gatekeeper_network` (token index 0).
pub fn gateway_token_address(owner: &Pubkey, gatekeeper_network: &Pubkey) -> CryptidResult<Pubkey> {
    find_address(
        &[owner.as_ref(), SEED_GATEWAY, &[0u8; 8], gatekeeper_network.as_ref()],
        &GATEWAY_PROGRAM_ID,
        "gateway token",
    )
}

#[derive(Debug, Clone)]
pub struct CheckPass {
    program: Pubkey,
    gatekeeper_network: Option<Pubkey>,
}

impl CheckPass {
    pub fn new(gatekeeper_network: Option<Pubkey>) -> Self {
        Self {
            program: PROGRAM_ID,
            gatekeeper_network,
        }
    }
}

impl Middleware for CheckPass {
    fn name(&self) -> &str {
        "check-pass"
    }

    fn extra_accounts(&self, ctx: &SignerContext) -> CryptidResult<Vec<AccountMeta>> {
        let middleware = require(ctx.middleware_account, &self.program, "middleware account")?;
        let network = require(self.gatekeeper_network, &self.program, "gatekeeper network")?;
        let token = gateway_token_address(&ctx.signer, &network)?;
        Ok(vec![
            AccountMeta::new_readonly(middleware, false),
            AccountMeta::new_readonly(token, false),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(signer: Pubkey) -> SignerContext {
        SignerContext {
            signer,
            cryptid_account: Pubkey::new_unique(),
            cryptid_signer: Pubkey::new_unique(),
            did_account: Pubkey::new_unique(),
            transaction_account: None,
            middleware_account: Some(Pubkey::new_unique()),
        }
    }

    #[test]
    fn gateway_token_depends_on_signer_and_network() {
        let network = Pubkey::new_unique();
        let handler = CheckPass::new(Some(network));
        let signer = Pubkey::new_unique();

        let extras = handler.extra_accounts(&ctx(signer)).unwrap();
        assert_eq!(extras[1].pubkey, gateway_token_address(&signer, &network).unwrap());

        let other = handler.extra_accounts(&ctx(Pubkey::new_unique())).unwrap();
        assert_ne!(extras[1].pubkey, other[1].pubkey);
        assert!(handler.setup_instruction(&ctx(signer)).unwrap().is_none());
    }

    #[test]
    fn missing_network_is_reported() {
        let err = CheckPass::new(None).extra_accounts(&ctx(Pubkey::new_unique())).unwrap_err();
        assert!(err.to_string().contains("gatekeeper network"));
    }
}
