//! `did:sol` identifiers.
//!
//! A DID string carries an optional cluster segment and the base58 authority
//! key it was generated from:
//!
//! ```text
//! did:sol:<authority>
//! did:sol:<cluster>:<authority>
//! ```
//!
//! Parsing is strict: the authority must decode to exactly 32 bytes.
//! Resolution of the DID document is delegated to a [`DidResolver`].

use std::fmt;
use std::str::FromStr;

use solana_program::pubkey::Pubkey;

use crate::constants::DID_SOL_PREFIX;
use crate::errors::{CryptidError, CryptidResult};
use crate::pda;

/// Cluster segment of a DID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Cluster {
    #[default]
    MainnetBeta,
    Devnet,
    Testnet,
    Localnet,
}

impl Cluster {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mainnet-beta" => Some(Self::MainnetBeta),
            "devnet" => Some(Self::Devnet),
            "testnet" => Some(Self::Testnet),
            "localnet" => Some(Self::Localnet),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainnetBeta => "mainnet-beta",
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
            Self::Localnet => "localnet",
        }
    }
}

/// A parsed `did:sol` identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Did {
    pub cluster: Cluster,
    pub authority: Pubkey,
}

impl Did {
    /// Build the generative DID for a key.
    pub fn from_authority(authority: Pubkey, cluster: Cluster) -> Self {
        Self { cluster, authority }
    }

    pub fn parse(input: &str) -> CryptidResult<Self> {
        let rest = input
            .strip_prefix(DID_SOL_PREFIX)
            .ok_or_else(|| CryptidError::invalid_did(input))?;

        let (cluster, key) = match rest.split_once(':') {
            Some((cluster, key)) => (
                Cluster::parse(cluster).ok_or_else(|| CryptidError::invalid_did(input))?,
                key,
            ),
            None => (Cluster::MainnetBeta, rest),
        };

        let bytes = bs58::decode(key)
            .into_vec()
            .map_err(|_| CryptidError::invalid_did(input))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptidError::invalid_did(input))?;

        Ok(Self {
            cluster,
            authority: Pubkey::new_from_array(bytes),
        })
    }
}

impl FromStr for Did {
    type Err = CryptidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cluster {
            Cluster::MainnetBeta => write!(f, "{DID_SOL_PREFIX}{}", self.authority),
            other => write!(f, "{DID_SOL_PREFIX}{}:{}", other.as_str(), self.authority),
        }
    }
}

/// Key material a resolver returns for a DID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidKeys {
    /// On-chain DID account (generative or initialized).
    pub account: Pubkey,
    /// Keys allowed to sign for the DID.
    pub authorities: Vec<Pubkey>,
}

impl DidKeys {
    pub fn is_authority(&self, key: &Pubkey) -> bool {
        self.authorities.contains(key)
    }
}

/// DID document resolution, implemented outside this crate for initialized
/// DIDs. Failures surface as `InvalidDidFormat` or `DidNotFound`.
pub trait DidResolver {
    fn resolve(&self, did: &Did) -> CryptidResult<DidKeys>;
}

/// Resolver for generative DIDs: the only authority is the key embedded in
/// the identifier.
#[derive(Debug, Clone)]
pub struct GenerativeResolver {
    pub did_program: Pubkey,
}

impl DidResolver for GenerativeResolver {
    fn resolve(&self, did: &Did) -> CryptidResult<DidKeys> {
        let (account, _) = pda::did_account_address(&self.did_program, did)?;
        Ok(DidKeys {
            account,
            authorities: vec![did.authority],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SOL_DID_PROGRAM_ID;
    use assert_matches::assert_matches;

    #[test]
    fn parse_mainnet_and_cluster_forms() {
        let key = Pubkey::new_unique();
        let d = Did::parse(&format!("did:sol:{key}")).unwrap();
        assert_eq!(d.cluster, Cluster::MainnetBeta);
        assert_eq!(d.authority, key);

        let d = Did::parse(&format!("did:sol:devnet:{key}")).unwrap();
        assert_eq!(d.cluster, Cluster::Devnet);
        assert_eq!(d.to_string(), format!("did:sol:devnet:{key}"));
    }

    #[test]
    fn display_round_trips() {
        let d = Did::from_authority(Pubkey::new_unique(), Cluster::Localnet);
        assert_eq!(Did::parse(&d.to_string()).unwrap(), d);
    }

    #[test]
    fn rejects_malformed() {
        assert_matches!(Did::parse("did:ethr:0x1234"), Err(CryptidError::InvalidDidFormat(_)));
        assert_matches!(Did::parse("did:sol:moonnet:11111111111111111111111111111111"), Err(CryptidError::InvalidDidFormat(_)));
        assert_matches!(Did::parse("did:sol:abc"), Err(CryptidError::InvalidDidFormat(_)));
        assert_matches!(Did::parse("did:sol:0OIl"), Err(CryptidError::InvalidDidFormat(_)));
    }

    #[test]
    fn generative_resolver_returns_embedded_key() {
        let did = Did::from_authority(Pubkey::new_unique(), Cluster::Devnet);
        let keys = GenerativeResolver { did_program: SOL_DID_PROGRAM_ID }
            .resolve(&did)
            .unwrap();
        assert!(keys.is_authority(&did.authority));
        assert_eq!(keys.authorities.len(), 1);
    }
}
