//! cli_flow.rs
//!
//! Black-box test of the `cryptid` binary without network access:
//! configure a keypair, derive addresses, and build (but not send)
//! propose/approve/execute instructions.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use solana_sdk::signature::{write_keypair_file, Keypair, Signer};

fn cryptid(config: &Path, args: &[&str]) -> Value {
    let out = Command::new(env!("CARGO_BIN_EXE_cryptid"))
        .arg("--json")
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("failed to spawn cryptid");
    assert!(
        out.status.success(),
        "cryptid {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("stdout is not json")
}

fn setup(dir: &Path) -> (PathBuf, Keypair) {
    let kp = Keypair::new();
    let kp_path = dir.join("id.json");
    write_keypair_file(&kp, &kp_path).unwrap();

    let config = dir.join("config.json");
    cryptid(&config, &["config", "set", "keypair", kp_path.to_str().unwrap()]);
    (config, kp)
}

fn write_tx(dir: &Path, signers: &[String]) -> PathBuf {
    let signers: Vec<Value> = signers.iter().map(|k| serde_json::json!({ "key": k })).collect();
    let tx = serde_json::json!({
        "signers": signers,
        "instructions": [{
            "program_id": "11111111111111111111111111111111",
            "accounts": [
                { "pubkey": "cryptid", "is_signer": true, "is_writable": true },
                { "pubkey": "SysvarRent111111111111111111111111111111111", "is_writable": true }
            ],
            "data": "02000000e803000000000000"
        }]
    });
    let path = dir.join("tx.json");
    fs::write(&path, serde_json::to_vec_pretty(&tx).unwrap()).unwrap();
    path
}

#[test]
fn address_uses_generative_did() {
    let dir = tempfile::tempdir().unwrap();
    let (config, kp) = setup(dir.path());

    let out = cryptid(&config, &["address"]);
    assert_eq!(out["did"], format!("did:sol:{}", kp.pubkey()));
    assert_eq!(out["index"], 0);

    let again = cryptid(&config, &["address"]);
    assert_eq!(out["cryptid_account"], again["cryptid_account"]);

    let other = cryptid(&config, &["address", "--index", "1"]);
    assert_ne!(out["cryptid_account"], other["cryptid_account"]);
    assert_eq!(out["did_account"], other["did_account"]);
}

#[test]
fn single_signer_executes_directly() {
    let dir = tempfile::tempdir().unwrap();
    let (config, _) = setup(dir.path());
    let tx = write_tx(dir.path(), &[]);

    let out = cryptid(&config, &["propose", tx.to_str().unwrap(), "--seed", "direct"]);
    assert_eq!(out["mode"], "direct");
    assert_eq!(out["instructions"].as_array().unwrap().len(), 1);
}

#[test]
fn staged_proposal_flow() {
    let dir = tempfile::tempdir().unwrap();
    let (config, kp) = setup(dir.path());
    let second = Keypair::new().pubkey().to_string();
    let tx = write_tx(dir.path(), &[kp.pubkey().to_string(), second.clone()]);
    let tx = tx.to_str().unwrap();

    let proposed = cryptid(&config, &["propose", tx, "--seed", "pay", "--staged"]);
    assert_eq!(proposed["mode"], "staged");
    assert_eq!(proposed["state"], "proposed");
    assert_eq!(proposed["ready_to_execute"], false);
    let account = proposed["transaction_account"].clone();

    let approved = cryptid(&config, &["approve", tx, "--seed", "pay", "--signer", &second]);
    assert_eq!(approved["state"], "approved");
    assert_eq!(approved["transaction_account"], account);

    let executed = cryptid(&config, &["execute", tx, "--seed", "pay", "--debug"]);
    assert_eq!(executed["state"], "executed");
    assert_eq!(executed["instructions"][0]["data"], "020001");
}

#[test]
fn middleware_listing() {
    let dir = tempfile::tempdir().unwrap();
    let out = cryptid(&dir.path().join("config.json"), &["middleware"]);
    let ids: Vec<&str> = out["middleware"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["check-pass", "check-recipient", "time-delay"]);
}
