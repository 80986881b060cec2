//! CLI configuration file.
//!
//! A small JSON document holding the defaults that would otherwise be
//! repeated on every command. Missing files read as an empty config.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use cryptid_core::config::{validate_config, CryptidConfig};
use cryptid_core::did::{Cluster, Did};
use cryptid_solana_client::default_rpc_url;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Keypair, Signer};

pub const KEYS: [&str; 7] = [
    "rpc_url",
    "keypair",
    "did",
    "index",
    "gatekeeper_network",
    "cryptid_program",
    "did_program",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keypair: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gatekeeper_network: Option<String>,
    /// Program id overrides, for local or forked deployments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cryptid_program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_program: Option<String>,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let s = serde_json::to_string_pretty(self)?;
        fs::write(path, format!("{s}\n")).with_context(|| format!("write {}", path.display()))
    }

    /// Set `key` from its string form, validating the value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "rpc_url" => self.rpc_url = Some(value.to_string()),
            "keypair" => self.keypair = Some(PathBuf::from(value)),
            "did" => {
                Did::parse(value)?;
                self.did = Some(value.to_string());
            }
            "index" => {
                self.index = Some(value.parse().with_context(|| format!("invalid index: {value}"))?);
            }
            "gatekeeper_network" => {
                parse_pubkey(value)?;
                self.gatekeeper_network = Some(value.to_string());
            }
            "cryptid_program" => {
                parse_pubkey(value)?;
                self.cryptid_program = Some(value.to_string());
            }
            "did_program" => {
                parse_pubkey(value)?;
                self.did_program = Some(value.to_string());
            }
            other => return Err(unknown_key(other)),
        }
        Ok(())
    }

    pub fn unset(&mut self, key: &str) -> Result<()> {
        match key {
            "rpc_url" => self.rpc_url = None,
            "keypair" => self.keypair = None,
            "did" => self.did = None,
            "index" => self.index = None,
            "gatekeeper_network" => self.gatekeeper_network = None,
            "cryptid_program" => self.cryptid_program = None,
            "did_program" => self.did_program = None,
            other => return Err(unknown_key(other)),
        }
        Ok(())
    }

    pub fn keypair(&self) -> Result<Keypair> {
        let path = self
            .keypair
            .as_ref()
            .ok_or_else(|| anyhow!("no keypair configured (cryptid config set keypair <path>)"))?;
        read_keypair_file(path).map_err(|e| anyhow!("read keypair {}: {e}", path.display()))
    }

    /// The configured DID, or the generative DID of the keypair.
    pub fn did(&self, override_did: Option<&str>) -> Result<Did> {
        if let Some(did) = override_did.or(self.did.as_deref()) {
            return Ok(Did::parse(did)?);
        }
        let authority = self.keypair()?.pubkey();
        Ok(Did::from_authority(authority, Cluster::default()))
    }

    /// Explicit `rpc_url`, else the public endpoint of the DID's cluster.
    pub fn rpc_url(&self, cluster: Cluster) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| default_rpc_url(cluster).to_string())
    }

    pub fn gatekeeper_network(&self) -> Result<Option<Pubkey>> {
        self.gatekeeper_network.as_deref().map(parse_pubkey).transpose()
    }

    /// Core configuration with any program id overrides applied.
    pub fn core(&self) -> Result<CryptidConfig> {
        let mut cfg = CryptidConfig::default();
        if let Some(program) = &self.cryptid_program {
            cfg.programs.cryptid = parse_pubkey(program)?;
        }
        if let Some(program) = &self.did_program {
            cfg.programs.did = parse_pubkey(program)?;
        }
        validate_config(&cfg)?;
        Ok(cfg)
    }
}

pub fn parse_pubkey(s: &str) -> Result<Pubkey> {
    Pubkey::from_str(s).map_err(|_| anyhow!("invalid pubkey: {s}"))
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow!("unknown config key {key}; expected one of {}", KEYS.join(", "))
}
