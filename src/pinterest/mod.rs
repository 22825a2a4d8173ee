mod client;
mod download;
mod fetch;
mod pin;
mod scroll;

pub use download::{download, DownloadOpts};

const BASE_URL: &str = "https://www.pinterest.com";
const LOGIN_URL: &str = "https://www.pinterest.com/login/";

// Browser identity used for both the WebDriver session and the image requests
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/115.0";
