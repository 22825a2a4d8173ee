use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::debug;

use crate::config;

mod download;

#[derive(Parser, Debug)]
#[clap(name = "pinsave", version = "0.1.0")]
/// Pinterest album downloader.
///
/// Signs in to Pinterest through a WebDriver-controlled browser, loads a whole
/// album and saves the full-size image of every pin in it.
pub struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Path to the config file holding credentials and preferences.
    #[clap(long, parse(from_os_str), default_value = "config.json")]
    config: PathBuf,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        debug!("Running command: {:?}", self);
        let config_path = config::expand_home(self.config.clone())?;
        self.command.run(config_path)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download every image of an album.
    Download(download::DownloadCommand),
}

impl Command {
    fn run(&self, config_path: PathBuf) -> Result<()> {
        match self {
            Command::Download(subcmd) => subcmd.run(&config_path),
        }
    }
}
