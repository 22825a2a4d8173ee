use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::Args;
use log::debug;

use crate::config::Config;
use crate::pinterest;
use crate::prompt::{self, Prompter};

#[derive(Args, Debug)]
pub struct DownloadCommand {
    /// URL of the album (board) to download. Asked interactively if omitted.
    #[clap(long)]
    album: Option<String>,

    /// Directory the images are saved to. Created if it does not exist.
    #[clap(long, parse(from_os_str), default_value = "downloaded_images")]
    output: PathBuf,

    /// Address of the WebDriver server that controls the browser.
    #[clap(long, default_value = "http://localhost:4444")]
    webdriver: String,

    /// Show the browser window and print details for every image (true/false). Asked interactively if omitted.
    #[clap(long)]
    show_process: Option<bool>,

    /// Stop scrolling the album after this many rounds even if it is still loading more pins.
    #[clap(long)]
    max_scrolls: Option<usize>,
}

impl DownloadCommand {
    pub fn run(&self, config_path: &Path) -> Result<()> {
        debug!("Running download command: {:?}", self);

        let mut conf = Config::load_or_create(config_path)?;
        let mut prompter = Prompter::stdio();

        let credentials = prompt::prompt_for_credentials(&mut conf, config_path, &mut prompter)?;

        let show_process = match self.show_process {
            Some(show) => show,
            None => prompter.confirm("Show process?", Some(conf.show_process))?,
        };

        let album_url = match &self.album {
            Some(url) => url.trim().to_string(),
            None => prompter.ask("Enter Pinterest album URL:")?,
        };
        if album_url.is_empty() {
            return Err(anyhow!("no album URL given"));
        }

        let opts = pinterest::DownloadOpts {
            album_url,
            target: self.output.clone(),
            show_process,
            webdriver: self.webdriver.clone(),
            max_scrolls: self.max_scrolls,
            credentials,
        };

        pinterest::download(opts)
    }
}
