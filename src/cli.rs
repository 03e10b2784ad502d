//! Command-line interface definition for chat
//!
//! This module defines the CLI structure using clap's derive API: one
//! optional positional prompt plus flags that override persisted settings.

use crate::config::{ModelKey, SettingsLayer};
use clap::Parser;
use std::path::PathBuf;

/// chat - terminal ChatGPT interface
///
/// Sends a prompt, together with the recent conversation, to a chat
/// completion model and prints the reply. Settings passed as flags are
/// remembered for the next run.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "chat")]
#[command(version, about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Text prompt, e.g. "Explain how pi is calculated."
    pub prompt: Option<String>,

    /// Show current settings and exit
    #[arg(short, long)]
    pub settings: bool,

    /// Select model
    #[arg(short, long, value_enum)]
    pub model: Option<ModelKey>,

    /// Creativity in (0.0, 2.0), higher is more creative
    #[arg(short, long, value_parser = parse_temperature)]
    pub temperature: Option<f64>,

    /// Instructions for the model
    #[arg(short, long)]
    pub instructions: Option<String>,

    /// Retain [0, 9] message pairs in the conversation
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=9))]
    pub retain: Option<u8>,

    /// Output borders around the response {0, 1}
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub border: Option<u8>,

    /// Path of the state file (defaults to ~/.chat)
    #[arg(long, value_name = "PATH", env = "CHAT_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// Log debug details to stderr
    #[arg(long)]
    pub verbose: bool,

    /// Show version number and exit
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: Option<bool>,
}

fn parse_temperature(value: &str) -> Result<f64, String> {
    let temperature: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if temperature > 0.0 && temperature < 2.0 {
        Ok(temperature)
    } else {
        Err(format!("{} is not inside (0.0, 2.0)", temperature))
    }
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Settings explicitly given on the command line
    ///
    /// # Examples
    ///
    /// ```
    /// use chat::cli::Cli;
    /// use clap::Parser;
    ///
    /// let cli = Cli::try_parse_from(["chat", "-r", "2", "-b", "0"]).unwrap();
    /// let layer = cli.overrides();
    /// assert_eq!(layer.retain, Some(2));
    /// assert_eq!(layer.border, Some(false));
    /// assert_eq!(layer.model, None);
    /// ```
    pub fn overrides(&self) -> SettingsLayer {
        SettingsLayer {
            model: self.model.map(|m| m.key().to_string()),
            temperature: self.temperature,
            instructions: self.instructions.clone(),
            retain: self.retain.map(i64::from),
            border: self.border.map(|b| b == 1),
        }
    }
}
