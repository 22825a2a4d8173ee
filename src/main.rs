use std::process;

use clap::Parser;

mod cli;
mod config;
mod console;
mod pinterest;
mod prompt;

fn main() {
    env_logger::init();

    let cli = cli::Cli::parse();
    if let Err(err) = cli.run() {
        console::error(&format!("{:#}", err));
        process::exit(1);
    }
}
