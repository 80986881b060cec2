use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use solana_sdk::signature::Signer;

use crate::cmd::session::Session;
use crate::config::CliConfig;
use crate::output;

#[derive(Debug, Serialize)]
pub struct Check {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

impl Check {
    fn new(name: &str, result: Result<String>) -> Self {
        match result {
            Ok(detail) => Self {
                name: name.to_string(),
                ok: true,
                detail,
            },
            Err(e) => Self {
                name: name.to_string(),
                ok: false,
                detail: format!("{e:#}"),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorOut {
    pub ok: bool,
    pub checks: Vec<Check>,
}

pub async fn run(config: &Path) -> Result<()> {
    let mut checks = Vec::new();

    let cfg = CliConfig::load(config);
    checks.push(Check::new(
        "config",
        cfg.as_ref()
            .map(|_| config.display().to_string())
            .map_err(|e| anyhow::anyhow!("{e:#}")),
    ));

    if let Ok(cfg) = &cfg {
        checks.push(Check::new(
            "keypair",
            cfg.keypair().map(|kp| kp.pubkey().to_string()),
        ));
    }

    match Session::load(config, None, None) {
        Ok(session) => {
            checks.push(Check::new(
                "cryptid account",
                Ok(format!("{} ({})", session.account.address, session.account.did)),
            ));

            let client = session.client();
            // Solana tooling is optional; the RPC endpoint is not.
            checks.push(Check::new(
                "rpc",
                client
                    .account_exists(&session.config.programs.cryptid)
                    .and_then(|deployed| {
                        if deployed {
                            Ok(format!("cryptid program {} found", session.config.programs.cryptid))
                        } else {
                            Err(anyhow::anyhow!(
                                "cryptid program {} not deployed on this cluster",
                                session.config.programs.cryptid
                            ))
                        }
                    }),
            ));
        }
        Err(e) => checks.push(Check::new("cryptid account", Err(e))),
    }

    checks.push(Check {
        name: "solana".to_string(),
        ok: which_ok("solana"),
        detail: "optional (solana CLI for funding and keypair management)".to_string(),
    });

    for c in &checks {
        output::status(c.ok, &c.name, &c.detail)?;
    }

    let ok = checks.iter().all(|c| c.ok || c.name == "solana");
    if output::is_json() {
        output::print(&DoctorOut { ok, checks })?;
    } else if !ok {
        output::eprintln_line("some checks failed");
    }
    Ok(())
}

fn which_ok(cmd: &str) -> bool {
    std::env::var_os("PATH")
        .and_then(|paths| {
            for p in std::env::split_paths(&paths) {
                if p.join(cmd).exists() {
                    return Some(());
                }
                #[cfg(windows)]
                {
                    if p.join(format!("{cmd}.exe")).exists() {
                        return Some(());
                    }
                }
            }
            None
        })
        .is_some()
}
