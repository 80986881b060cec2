use anyhow::Result;
use serde::Serialize;

use cryptid_middleware::builtin::builtin_catalog;

use crate::output;

#[derive(Debug, Serialize)]
pub struct MiddlewareInfo {
    pub id: String,
    pub name: String,
    pub program: String,
    pub extra_accounts: Vec<String>,
    pub needs_setup: bool,
}

#[derive(Debug, Serialize)]
pub struct MiddlewareOut {
    pub middleware: Vec<MiddlewareInfo>,
}

pub async fn run() -> Result<()> {
    let catalog = builtin_catalog()?;

    let middleware = catalog
        .iter()
        .map(|s| MiddlewareInfo {
            id: s.id.as_str().to_string(),
            name: s.name.clone(),
            program: s.program.to_string(),
            extra_accounts: s.extra_accounts.clone(),
            needs_setup: s.needs_setup,
        })
        .collect();

    output::print(&MiddlewareOut { middleware })
}
