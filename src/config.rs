use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use config_rs::{Config as ConfigRs, File, FileFormat};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub email: String,
    pub password: String,

    // Whether the user chose to keep the credentials above on the last run. The credential prompt rewrites this
    // on every run, regardless of the answer.
    pub save_credentials: bool,

    // Default answer for the "show process" question, which also decides whether the browser runs headless.
    pub show_process: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            email: String::new(),
            password: String::new(),
            save_credentials: false,
            show_process: true,
        }
    }
}

impl Config {
    /// Loads the config at `path`, writing the defaults there first if the file does not exist yet.
    ///
    /// The fields are not validated. A malformed file or a missing key is returned as an error.
    pub fn load_or_create(path: &Path) -> Result<Config> {
        debug!("checking config path: {:?}", path);

        if !path.exists() {
            debug!("config not found, writing defaults to {:?}", path);
            Config::default().save(path)?;
        }

        let s = ConfigRs::builder()
            .add_source(File::from(path).format(FileFormat::Json))
            .build()?;
        let conf: Config = s.try_deserialize()?;

        Ok(conf)
    }

    /// Overwrites `path` with this config.
    pub fn save(&self, path: &Path) -> Result<()> {
        // The file is written with a four-space indent
        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut ser)?;

        fs::write(path, buf)?;
        Ok(())
    }

    pub fn has_credentials(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

/// Expands a leading `~` to `$HOME`. Other paths are returned as they are.
pub fn expand_home(path: PathBuf) -> Result<PathBuf> {
    if !path.starts_with("~") {
        return Ok(path);
    }

    let home = std::env::var("HOME").map_err(|_| anyhow!("unable to expand '~': HOME is not set"))?;
    let mut new_path = PathBuf::from(home);
    new_path.push(path.strip_prefix("~")?);

    Ok(new_path)
}
