use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::args::ConfigAction;
use crate::config::CliConfig;
use crate::output;

#[derive(Debug, Serialize)]
pub struct ConfigOut<'a> {
    pub path: String,
    pub config: &'a CliConfig,
}

pub async fn run(path: &Path, action: ConfigAction) -> Result<()> {
    let mut cfg = CliConfig::load(path)?;
    match action {
        ConfigAction::Show => {}
        ConfigAction::Set { key, value } => {
            cfg.set(&key, &value)?;
            cfg.save(path)?;
            tracing::info!(%key, path = %path.display(), "config updated");
        }
        ConfigAction::Unset { key } => {
            cfg.unset(&key)?;
            cfg.save(path)?;
        }
    }
    output::print(&ConfigOut {
        path: path.display().to_string(),
        config: &cfg,
    })
}
