//! Middleware catalog and name resolution.
//!
//! The catalog stores middleware specs keyed by id and resolves user input
//! (an id such as `time-delay` or a base58 program id) to a spec.
//!
//! Requirements:
//! - stable ordering for listings
//! - clear errors for unknown or duplicate middleware
//! - no global mutable state
//!
//! The catalog does not hold handlers; those live in
//! [`cryptid_core::middleware::MiddlewareRegistry`].

use std::collections::BTreeMap;
use std::str::FromStr;

use solana_program::pubkey::Pubkey;

use crate::spec::MiddlewareSpec;

#[derive(Debug, Default)]
pub struct MiddlewareCatalog {
    specs: BTreeMap<String, MiddlewareSpec>,
}

impl MiddlewareCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Add a spec. Ids and program ids must both be unique.
    pub fn register(&mut self, spec: MiddlewareSpec) -> anyhow::Result<()> {
        spec.validate()?;

        let id = spec.id.as_str().to_string();
        if self.specs.contains_key(&id) {
            anyhow::bail!("middleware id already registered: {id}");
        }
        if let Some(other) = self.by_program(&spec.program) {
            anyhow::bail!(
                "program {} already registered as {}",
                spec.program,
                other.id.as_str()
            );
        }

        self.specs.insert(id, spec);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&MiddlewareSpec> {
        self.specs.get(id)
    }

    pub fn by_program(&self, program: &Pubkey) -> Option<&MiddlewareSpec> {
        self.specs.values().find(|s| s.program == *program)
    }

    /// Ids in sorted order.
    pub fn list_ids(&self) -> Vec<String> {
        self.specs.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MiddlewareSpec> {
        self.specs.values()
    }

    /// Resolve an id or a base58 program id.
    ///
    /// A program id that is not in the catalog still resolves to itself so
    /// that third-party middleware can be named on the command line; its
    /// handler must then be registered separately.
    pub fn resolve_program(&self, input: &str) -> anyhow::Result<Pubkey> {
        if let Some(spec) = self.get(input) {
            return Ok(spec.program);
        }
        Pubkey::from_str(input).map_err(|_| {
            anyhow::anyhow!(
                "unknown middleware {input}; expected one of [{}] or a program id",
                self.list_ids().join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> (MiddlewareCatalog, Pubkey) {
        let program = Pubkey::new_unique();
        let mut c = MiddlewareCatalog::new();
        c.register(MiddlewareSpec::new("check-recipient", "Check recipient", program))
            .unwrap();
        (c, program)
    }

    #[test]
    fn register_and_resolve() {
        let (c, program) = catalog();
        assert_eq!(c.resolve_program("check-recipient").unwrap(), program);
        assert_eq!(c.by_program(&program).unwrap().id.as_str(), "check-recipient");

        let other = Pubkey::new_unique();
        assert_eq!(c.resolve_program(&other.to_string()).unwrap(), other);
        assert!(c.resolve_program("nope").is_err());
    }

    #[test]
    fn duplicates_are_rejected() {
        let (mut c, program) = catalog();
        assert!(c
            .register(MiddlewareSpec::new("check-recipient", "Again", Pubkey::new_unique()))
            .is_err());
        assert!(c.register(MiddlewareSpec::new("other", "Other", program)).is_err());
        assert_eq!(c.len(), 1);
    }
}
