use clap::Parser;
use std::process::ExitCode;

use factorcast::cli::{run, Cli};

fn main() -> ExitCode {
    env_logger::init();
    run(Cli::parse())
}
