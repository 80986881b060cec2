//! Built-in middleware handlers and their catalog.
//!
//! UIs and the CLI can query the built-in specs without building handlers.
//! Handlers are registered into a caller-owned registry; nothing here keeps
//! process-wide state.

pub mod check_pass;
pub mod check_recipient;
pub mod time_delay;

use cryptid_core::errors::CryptidError;
use cryptid_core::middleware::MiddlewareRegistry;
use sha2::{Digest, Sha256};
use solana_program::pubkey::Pubkey;

use crate::registry::MiddlewareCatalog;
use crate::spec::MiddlewareSpec;

/// Built-in middleware ids, in catalog order.
pub const BUILTIN_MIDDLEWARE_IDS: [&str; 3] = ["check-pass", "check-recipient", "time-delay"];

/// Options for handlers that need data not derivable from the signer.
#[derive(Debug, Clone, Default)]
pub struct BuiltinOptions {
    /// Gatekeeper network whose passes check-pass accepts.
    pub gatekeeper_network: Option<Pubkey>,
}

pub fn builtin_specs() -> Vec<MiddlewareSpec> {
    vec![
        check_pass::spec(),
        check_recipient::spec(),
        time_delay::spec(),
    ]
}

pub fn builtin_catalog() -> anyhow::Result<MiddlewareCatalog> {
    let mut catalog = MiddlewareCatalog::new();
    for spec in builtin_specs() {
        catalog.register(spec)?;
    }
    Ok(catalog)
}

/// Register every built-in handler into `registry`.
pub fn register_builtins(registry: &mut MiddlewareRegistry, options: &BuiltinOptions) {
    check_pass::register(registry, options.gatekeeper_network);
    check_recipient::register(registry);
    time_delay::register(registry);
}

/// First eight bytes of `sha256("global:<name>")`, the Anchor instruction
/// discriminator.
pub(crate) fn anchor_discriminator(name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("global:{name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

pub(crate) fn find_address(
    seeds: &[&[u8]],
    program: &Pubkey,
    what: &str,
) -> Result<Pubkey, CryptidError> {
    Pubkey::try_find_program_address(seeds, program)
        .map(|(key, _)| key)
        .ok_or_else(|| CryptidError::Middleware {
            program: *program,
            message: format!("no valid bump seed for {what}"),
        })
}

pub(crate) fn require(
    value: Option<Pubkey>,
    program: &Pubkey,
    what: &str,
) -> Result<Pubkey, CryptidError> {
    value.ok_or_else(|| CryptidError::Middleware {
        program: *program,
        message: format!("{what} is required"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_specs() {
        let specs = builtin_specs();
        let ids: Vec<&str> = specs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, BUILTIN_MIDDLEWARE_IDS);
    }

    #[test]
    fn catalog_and_registry_agree() {
        let catalog = builtin_catalog().unwrap();
        let mut registry = MiddlewareRegistry::new();
        register_builtins(&mut registry, &BuiltinOptions::default());

        assert_eq!(catalog.len(), registry.len());
        for spec in catalog.iter() {
            let handler = registry.get(&spec.program).unwrap();
            assert_eq!(handler.name(), spec.id.as_str());
        }
    }

    #[test]
    fn discriminator_is_stable() {
        let a = anchor_discriminator("register_transaction");
        assert_eq!(a, anchor_discriminator("register_transaction"));
        assert_ne!(a, anchor_discriminator("execute_middleware"));
    }
}
