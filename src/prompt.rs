use std::io::{self, BufRead, Stdin, StdinLock, Stdout, Write};
use std::path::Path;

use anyhow::{anyhow, Result};
use colored::*;
use log::debug;

use crate::config::Config;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Line-based interaction with the user. Generic over the streams so the flows can be driven from tests.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Prompter::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompter { input, output }
    }

    /// Asks a free-form question and returns the trimmed answer.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{} ", question.cyan())?;
        self.output.flush()?;
        self.read_answer()
    }

    /// Asks a yes or no question.
    ///
    /// `y`, `yes`, `n` and `no` are accepted in any case. A blank answer picks `default` when there is one,
    /// anything else asks again.
    pub fn confirm(&mut self, question: &str, default: Option<bool>) -> Result<bool> {
        loop {
            write!(self.output, "{} ", format!("{} (y/n):", question).yellow())?;
            self.output.flush()?;

            let answer = self.read_answer()?.to_lowercase();
            match (answer.as_str(), default) {
                ("y" | "yes", _) => return Ok(true),
                ("n" | "no", _) => return Ok(false),
                ("", Some(default)) => return Ok(default),
                _ => writeln!(
                    self.output,
                    "Unable to parse input. Please respond using the provided options (case-insensitive)."
                )?,
            }
        }
    }

    fn read_answer(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(anyhow!("input closed while waiting for an answer"));
        }
        Ok(line.trim().to_string())
    }
}

/// Works out which credentials to log in with.
///
/// Saved credentials are offered first. Otherwise the user types them in and decides whether they are kept; that
/// decision is written back to `path` either way. An unrecognised answer to either yes/no question asks again
/// rather than counting as no.
pub fn prompt_for_credentials<R: BufRead, W: Write>(
    conf: &mut Config,
    path: &Path,
    prompter: &mut Prompter<R, W>,
) -> Result<Credentials> {
    if conf.has_credentials() && prompter.confirm("Use saved credentials?", None)? {
        debug!("reusing saved credentials for {}", conf.email);
        return Ok(Credentials {
            email: conf.email.clone(),
            password: conf.password.clone(),
        });
    }

    let email = prompter.ask("Enter your email:")?;
    let password = prompter.ask("Enter your password:")?;

    if prompter.confirm("Save credentials for future use?", None)? {
        conf.email = email.clone();
        conf.password = password.clone();
        conf.save_credentials = true;
    } else {
        // Previously stored credentials are left in place
        conf.save_credentials = false;
    }
    conf.save(path)?;

    Ok(Credentials { email, password })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{prompt_for_credentials, Credentials, Prompter};
    use crate::config::Config;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn saved_config() -> Config {
        Config {
            email: "saved@example.com".into(),
            password: "saved-pw".into(),
            save_credentials: true,
            show_process: true,
        }
    }

    #[test]
    fn reuse_saved_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut conf = saved_config();

        let creds = prompt_for_credentials(&mut conf, &path, &mut prompter("y\n")).unwrap();

        assert_eq!(
            creds,
            Credentials {
                email: "saved@example.com".into(),
                password: "saved-pw".into(),
            }
        );
        assert_eq!(conf, saved_config());
        // Reusing does not rewrite the config
        assert!(!path.exists());
    }

    #[test]
    fn unrecognised_answer_asks_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut conf = saved_config();

        let creds = prompt_for_credentials(&mut conf, &path, &mut prompter("sure\ny\n")).unwrap();

        assert_eq!(creds.email, "saved@example.com");
        assert!(!path.exists());
    }

    #[test]
    fn enter_and_save_new_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut conf = Config::default();

        let creds = prompt_for_credentials(
            &mut conf,
            &path,
            &mut prompter("new@example.com\n  new-pw  \nY\n"),
        )
        .unwrap();

        assert_eq!(creds.email, "new@example.com");
        assert_eq!(creds.password, "new-pw");

        let stored = Config::load_or_create(&path).unwrap();
        assert_eq!(stored.email, "new@example.com");
        assert_eq!(stored.password, "new-pw");
        assert!(stored.save_credentials);
    }

    #[test]
    fn decline_saved_and_do_not_save_new() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut conf = saved_config();

        let creds = prompt_for_credentials(
            &mut conf,
            &path,
            &mut prompter("n\nother@example.com\nother-pw\nno\n"),
        )
        .unwrap();

        assert_eq!(creds.email, "other@example.com");

        let stored = Config::load_or_create(&path).unwrap();
        assert!(!stored.save_credentials);
        assert_eq!(stored.email, "saved@example.com");
        assert_eq!(stored.password, "saved-pw");
    }

    #[test]
    fn confirm_reprompts_and_uses_default() {
        let mut p = prompter("maybe\n\n");
        assert!(!p.confirm("Show process?", Some(false)).unwrap());

        let mut p = prompter("\nyes\n");
        assert!(p.confirm("Use saved credentials?", None).unwrap());
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut p = prompter("");
        assert!(p.confirm("Show process?", Some(true)).is_err());
        assert!(p.ask("Enter Pinterest album URL:").is_err());
    }
}
