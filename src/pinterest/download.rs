use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use log::{debug, warn};

use crate::console;
use crate::prompt::Credentials;

use super::client::{Client, ClientOpts};
use super::fetch::{DownloadOutcome, ImageFetcher};
use super::pin::{normalize_pin_url, pin_links_from_html, PinImage};
use super::scroll::{scroll_to_end, ScrollEnd, ScrollOpts};

// Wait after each scroll for the board to load the next batch of pins
const SCROLL_DELAY: Duration = Duration::from_secs(2);

// Wait on a pin page for its image to show up
const PIN_SETTLE: Duration = Duration::from_secs(3);

pub struct DownloadOpts {
    pub album_url: String,
    pub target: PathBuf,

    // Show the browser window and print per-image details
    pub show_process: bool,

    pub webdriver: String,
    pub max_scrolls: Option<usize>,

    pub credentials: Credentials,
}

#[derive(Debug, Default, Eq, PartialEq)]
struct Summary {
    pins: usize,
    saved: usize,
    failed: usize,
}

impl Summary {
    fn record_download(&mut self, outcome: &DownloadOutcome) {
        self.pins += 1;
        match outcome {
            DownloadOutcome::Saved(_) => self.saved += 1,
            _ => self.failed += 1,
        }
    }

    // The pin page could not be opened or had no usable image
    fn record_missing(&mut self) {
        self.pins += 1;
        self.failed += 1;
    }
}

pub fn download(opts: DownloadOpts) -> Result<()> {
    // Guarantee that the download target is valid and is a directory
    if !opts.target.exists() {
        fs::create_dir_all(&opts.target)?;
    } else if opts.target.is_file() {
        return Err(anyhow!("download target must be a directory"));
    }

    // NOTE: Everything below runs strictly one step at a time, so a single-threaded runtime is all we need.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(download_async(opts))
}

async fn download_async(opts: DownloadOpts) -> Result<()> {
    let client_opts = ClientOpts {
        headless: !opts.show_process,
        webdriver: opts.webdriver.clone(),
    };
    let mut client = Client::new(client_opts).await?;

    // The browser is closed whether the run finished or stopped on a fatal error
    let result = run(&mut client, &opts).await;
    if let Err(err) = client.close().await {
        warn!("failed to close the browser session: {:?}", err);
    }

    let summary = result?;
    console::info(&format!(
        "Visited {} pins: {} images saved, {} failed.",
        console::value(summary.pins),
        console::value(summary.saved),
        console::value(summary.failed)
    ));

    Ok(())
}

async fn run(client: &mut Client, opts: &DownloadOpts) -> Result<Summary> {
    console::info("Navigating to Pinterest login page...");
    client
        .login(&opts.credentials.email, &opts.credentials.password)
        .await?;
    console::success("Login successful!");

    console::info(&format!(
        "Navigating to album page: {}",
        console::value(&opts.album_url)
    ));
    client.open_album(&opts.album_url).await?;
    console::success("Successfully navigated to album page.");

    let scroll_opts = ScrollOpts {
        delay: SCROLL_DELAY,
        max_rounds: opts.max_scrolls,
    };
    match scroll_to_end(client, &scroll_opts).await? {
        ScrollEnd::Settled { rounds } => debug!("album fully loaded after {} scrolls", rounds),
        ScrollEnd::Capped { rounds } => console::warn(&format!(
            "Stopped scrolling after {} rounds; the album may not be fully loaded.",
            console::value(rounds)
        )),
    }

    let pin_urls = pin_links_from_html(&client.source().await?);
    console::info(&format!("Found {} pins.", console::value(pin_urls.len())));

    let fetcher = ImageFetcher::new(opts.target.clone(), opts.show_process)?;
    let mut summary = Summary::default();

    for href in &pin_urls {
        let pin_url = normalize_pin_url(href);
        match image_url_for_pin(client, &pin_url).await {
            Ok(Some(img_url)) => {
                console::info(&format!("Found image: {}", console::value(&img_url)));
                let outcome = fetcher.fetch(&img_url).await;
                summary.record_download(&outcome);
            }
            Ok(None) => summary.record_missing(),
            Err(err) => {
                console::error(&format!(
                    "Failed to open pin {}: {:#}",
                    console::value(&pin_url),
                    err
                ));
                summary.record_missing();
            }
        }
    }

    Ok(summary)
}

// Visits a pin page and picks its image URL. A missing element or URL is reported here and yields `None`.
async fn image_url_for_pin(client: &mut Client, pin_url: &str) -> Result<Option<String>> {
    client.goto(pin_url).await?;
    tokio::time::sleep(PIN_SETTLE).await;

    let image = match PinImage::from_html(&client.source().await?) {
        Some(image) => image,
        None => {
            console::error("Failed to find image element on page.");
            return Ok(None);
        }
    };

    let url = image.url();
    if url.is_none() {
        console::error("Failed to find image URL.");
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::{download, DownloadOpts, Summary};
    use crate::pinterest::fetch::DownloadOutcome;
    use crate::prompt::Credentials;

    fn opts(target: PathBuf, webdriver: &str) -> DownloadOpts {
        DownloadOpts {
            album_url: "https://www.pinterest.com/someone/travel/".into(),
            target,
            show_process: false,
            webdriver: webdriver.into(),
            max_scrolls: Some(1),
            credentials: Credentials {
                email: "someone@example.com".into(),
                password: "pw".into(),
            },
        }
    }

    #[test]
    fn file_target_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("not-a-dir");
        fs::write(&target, b"").unwrap();

        let err = download(opts(target.clone(), "http://127.0.0.1:1")).unwrap_err();
        assert!(err.to_string().contains("must be a directory"));
        assert!(target.is_file());
    }

    #[test]
    fn missing_target_is_created_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out").join("images");

        // Nothing listens on port 1, so the run stops at the WebDriver connection
        let err = download(opts(target.clone(), "http://127.0.0.1:1")).unwrap_err();
        assert!(err.to_string().contains("failed to connect to WebDriver"));
        assert!(target.is_dir());
    }

    #[test]
    fn summary_counts_outcomes() {
        let mut summary = Summary::default();
        summary.record_download(&DownloadOutcome::Saved("img123.jpg".into()));
        summary.record_download(&DownloadOutcome::BadStatus(404));
        summary.record_download(&DownloadOutcome::InvalidUrl);
        summary.record_missing();
        summary.record_download(&DownloadOutcome::Saved("img456.jpg".into()));

        assert_eq!(
            summary,
            Summary {
                pins: 5,
                saved: 2,
                failed: 3,
            }
        );
    }
}
