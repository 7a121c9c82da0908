use clap::Parser;
use scraptrack::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
