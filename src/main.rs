use clap::Parser;
use std::process::ExitCode;
use textdesk::cli::{self, Cli};
use textdesk::{error, logging};

fn main() -> ExitCode {
    error::setup_panic_handler();

    let cli = Cli::parse();
    logging::init(cli.logger());

    cli::run(cli)
}
