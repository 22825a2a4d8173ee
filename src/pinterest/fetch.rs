use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use log::debug;
use reqwest::StatusCode;

use crate::console;

use super::USER_AGENT;

#[derive(Debug, Eq, PartialEq)]
pub enum DownloadOutcome {
    Saved(PathBuf),
    InvalidUrl,
    BadStatus(u16),
    Failed(String),
}

/// Downloads images into a single folder. Every outcome is reported on the console; nothing is returned as an
/// error so one bad image never stops the run.
pub struct ImageFetcher {
    http: reqwest::Client,
    folder: PathBuf,

    // Print the URL and the target path before saving
    verbose: bool,
}

impl ImageFetcher {
    pub fn new(folder: PathBuf, verbose: bool) -> Result<ImageFetcher> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(ImageFetcher::with_client(http, folder, verbose))
    }

    pub fn with_client(http: reqwest::Client, folder: PathBuf, verbose: bool) -> ImageFetcher {
        ImageFetcher {
            http,
            folder,
            verbose,
        }
    }

    pub async fn fetch(&self, url: &str) -> DownloadOutcome {
        if !url.starts_with("http") {
            console::error(&format!("Invalid image URL: {}", console::value(url)));
            return DownloadOutcome::InvalidUrl;
        }

        match self.try_fetch(url).await {
            Ok(outcome) => outcome,
            Err(err) => {
                console::error(&format!("Error downloading image: {:#}", err));
                DownloadOutcome::Failed(format!("{:#}", err))
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<DownloadOutcome> {
        let response = self.http.get(url).send().await?;
        debug!("GET {} -> {}", url, response.status());

        if response.status() != StatusCode::OK {
            console::error(&format!(
                "Failed to download image: {} (Status: {})",
                console::value(url),
                response.status().as_u16()
            ));
            return Ok(DownloadOutcome::BadStatus(response.status().as_u16()));
        }

        let path = self.folder.join(file_name_from_url(url)?);
        if self.verbose {
            console::info(&format!("Downloading image: {}", console::value(url)));
            console::info(&format!("Saving to: {}", console::value(path.display())));
        }

        let bytes = response.bytes().await?;
        fs::write(&path, &bytes)?;

        if path.exists() {
            console::success(&format!(
                "Image successfully saved: {}",
                console::value(path.display())
            ));
            Ok(DownloadOutcome::Saved(path))
        } else {
            console::error(&format!(
                "Failed to save image: {}",
                console::value(path.display())
            ));
            Ok(DownloadOutcome::Failed(format!(
                "{} is missing after the write",
                path.display()
            )))
        }
    }
}

/// The last path segment of `url`, without the query string.
pub fn file_name_from_url(url: &str) -> Result<&str> {
    let last = url.rsplit('/').next().unwrap_or(url);
    let name = last.split('?').next().unwrap_or(last);

    if name.is_empty() {
        return Err(anyhow!("unable to derive a file name from '{}'", url));
    }
    Ok(name)
}
