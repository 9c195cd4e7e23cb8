mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::cli::{Cli, Command};
use crate::commands::Status;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();

    let result = match &cli.command {
        Command::Format(args) => commands::format(args),
        Command::Add(args) => commands::add(args),
        Command::Ls(args) => commands::ls(args, &mut stdout),
        Command::Cat(args) => commands::cat(args, &mut stdout),
        Command::Check(args) => commands::check(args),
    };

    match result {
        Ok(Status::Ok) => ExitCode::SUCCESS,
        Ok(Status::IssuesFound) => ExitCode::from(1),
        Err(err) => {
            error!(kind = commands::error_kind(&err), "{err:#}");
            ExitCode::from(minivsfs::ops::exit_code(&err))
        }
    }
}
