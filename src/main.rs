use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    readmark::logging::init("warn").context("init logging")?;

    let cli = readmark::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let mut service = cli.storage.open_service()?;
    let mut stdout = std::io::stdout().lock();
    readmark::commands::run(&mut service, cli.command, &mut stdout)
}
