use std::fmt::Display;

use colored::*;

// Status lines meant for the person running the tool. Diagnostics go through the `log` macros instead.

pub fn info(msg: &str) {
    println!("{} {}", "[INFO]".cyan(), msg);
}

pub fn success(msg: &str) {
    println!("{} {}", "[SUCCESS]".green(), msg);
}

pub fn warn(msg: &str) {
    println!("{} {}", "[WARN]".yellow(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "[ERROR]".red(), msg);
}

/// Highlights a value (URL, path, count) inside a status line.
pub fn value<T: Display>(v: T) -> ColoredString {
    v.to_string().yellow()
}
