use anyhow::Result;
use clap::Parser;

mod args;
mod cmd;
mod config;
mod io;
mod output;
mod solana;
mod telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = args::Cli::parse();
    output::init(cli.json);
    telemetry::init(cli.json);

    cmd::dispatch(cli).await
}
