use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use fantoccini::{Client as WebClient, ClientBuilder as WebClientBuilder, Locator};
use log::debug;
use serde_json::json;

use super::scroll::ScrollPage;
use super::{LOGIN_URL, USER_AGENT};

// Login form selectors
const SEL_EMAIL: &str = "input[name='id']";
const SEL_PASSWORD: &str = "input[name='password']";
const SEL_SUBMIT: &str = "button[type='submit']";

// Time for the post-login navigation to start before we poll for the page to be loaded
const LOGIN_SETTLE: Duration = Duration::from_secs(3);
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);
const LOAD_POLL: Duration = Duration::from_millis(250);

pub struct ClientOpts {
    pub headless: bool,

    // Address of the WebDriver server, e.g. a local geckodriver
    pub webdriver: String,
}

pub struct Client {
    // Pinterest has no public API for boards, so everything goes through a real browser driven over WebDriver.
    client: WebClient,
}

impl Client {
    pub async fn new(opts: ClientOpts) -> Result<Client> {
        let mut client = WebClientBuilder::native();

        let mut args = vec![];
        if opts.headless {
            args.push("-headless");
        }
        let mut caps = serde_json::Map::new();
        caps.insert(
            String::from("moz:firefoxOptions"),
            json!({
                "args": args,
                "prefs": { "general.useragent.override": USER_AGENT },
            }),
        );
        client.capabilities(caps);

        debug!("connecting to WebDriver at {}", opts.webdriver);
        let client = client
            .connect(&opts.webdriver)
            .await
            .map_err(|e| anyhow!("failed to connect to WebDriver at {}: {}", opts.webdriver, e))?;

        Ok(Client { client })
    }

    /// Signs in through the login form. Returns an error if the browser is still on a login page afterwards.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        self.client.goto(LOGIN_URL).await?;

        // The form is mounted by script after the document has loaded
        self.client
            .wait()
            .at_most(LOAD_TIMEOUT)
            .for_element(Locator::Css(SEL_EMAIL))
            .await?
            .send_keys(email)
            .await?;
        self.client
            .find(Locator::Css(SEL_PASSWORD))
            .await?
            .send_keys(password)
            .await?;
        self.client.find(Locator::Css(SEL_SUBMIT)).await?.click().await?;

        tokio::time::sleep(LOGIN_SETTLE).await;
        self.wait_until_loaded().await?;

        let cur_url = self.client.current_url().await?;
        debug!("url after login: {}", cur_url);
        if login_failed(cur_url.as_str()) {
            return Err(anyhow!("login failed, check your credentials and try again"));
        }

        Ok(())
    }

    /// Opens the album page. The browser must end up on a URL containing `album_url`.
    pub async fn open_album(&mut self, album_url: &str) -> Result<()> {
        self.goto(album_url).await?;

        let cur_url = self.client.current_url().await?;
        if !on_album(cur_url.as_str(), album_url) {
            return Err(anyhow!(
                "failed to navigate to album page, ended up at {}",
                cur_url
            ));
        }

        Ok(())
    }

    pub async fn goto(&mut self, url: &str) -> Result<()> {
        debug!("navigating to {}", url);
        self.client.goto(url).await?;
        self.wait_until_loaded().await
    }

    /// Serialized DOM of the current page, including content added by scripts.
    pub async fn source(&mut self) -> Result<String> {
        Ok(self.client.source().await?)
    }

    pub async fn close(mut self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }

    // Navigation blocks until the load event in most drivers, a form submit does not. Running out of time is not
    // an error since the caller checks the URL afterwards.
    async fn wait_until_loaded(&mut self) -> Result<()> {
        let start = Instant::now();
        loop {
            let state = self
                .client
                .execute("return document.readyState;", vec![])
                .await?;
            if state.as_str() == Some("complete") {
                return Ok(());
            }
            if start.elapsed() > LOAD_TIMEOUT {
                debug!("page still '{}' after {:?}, carrying on", state, LOAD_TIMEOUT);
                return Ok(());
            }
            tokio::time::sleep(LOAD_POLL).await;
        }
    }
}

impl ScrollPage for Client {
    async fn scroll_height(&mut self) -> Result<u64> {
        let height = self
            .client
            .execute("return document.body.scrollHeight;", vec![])
            .await?;

        height
            .as_u64()
            .or_else(|| height.as_f64().map(|h| h as u64))
            .ok_or_else(|| anyhow!("unexpected scroll height: {}", height))
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        self.client
            .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
            .await?;
        Ok(())
    }
}

/// A successful sign in redirects away from the login page.
pub fn login_failed(current_url: &str) -> bool {
    current_url.contains("login")
}

/// Whether the browser landed on the requested album. A query string added after the album URL still counts.
pub fn on_album(current_url: &str, album_url: &str) -> bool {
    current_url.contains(album_url)
}
