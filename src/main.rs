use std::process::ExitCode;

use clap::Parser;
use log::error;
use note_import::{Cli, Command, ImportConfig, ImportError};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err);
            if let Some(note) = err.note() {
                error!("import stopped due to error in: {}", note);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, ImportError> {
    let config = ImportConfig::load(&cli.overrides(), &cli.env_file)?;

    match cli.command.clone().unwrap_or_default() {
        Command::Import { dry_run } => cmd::import::run(&config, dry_run, cli.json),
        Command::Check => cmd::check::run(&config, cli.json),
    }
}

mod cmd {
    pub mod check;
    pub mod import;
}
