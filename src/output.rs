//! Terminal output for replies, settings and usage examples
//!
//! Everything writes to a `std::io::Write` so the binary can pass stdout and
//! tests can pass a buffer.

use crate::config::Settings;
use std::io::{self, Write};

/// Width used when the terminal size cannot be determined
pub const FALLBACK_WIDTH: usize = 80;

const BORDER_CHAR: char = '*';

/// Current terminal width in columns
pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .ok()
        .map(|(columns, _)| columns as usize)
        .filter(|columns| *columns > 0)
        .unwrap_or(FALLBACK_WIDTH)
}

/// Print a reply, framed by border lines when `border` is set
///
/// # Examples
///
/// ```
/// use chat::output::print_reply;
///
/// let mut out = Vec::new();
/// print_reply(&mut out, "Pi is...", true, 5).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "*****\nPi is...\n*****\n");
/// ```
pub fn print_reply<W: Write>(out: &mut W, reply: &str, border: bool, width: usize) -> io::Result<()> {
    let line: String = std::iter::repeat(BORDER_CHAR).take(width).collect();

    if border {
        writeln!(out, "{}", line)?;
    }
    writeln!(out, "{}", reply)?;
    if border {
        writeln!(out, "{}", line)?;
    }
    out.flush()
}

/// Print fully resolved settings
pub fn print_settings<W: Write>(out: &mut W, settings: &Settings) -> io::Result<()> {
    writeln!(out, "settings:")?;
    writeln!(out, "  model: {}", settings.model)?;
    writeln!(out, "  temperature: {:?}", settings.temperature)?;
    writeln!(out, "  instructions: \"{}\"", settings.instructions)?;
    writeln!(out, "  retain: {}", settings.retain)?;
    writeln!(out, "  border: {}", u8::from(settings.border))?;
    out.flush()
}

/// Print the examples shown for a bare invocation
pub fn print_usage<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "chat --help")?;
    writeln!(out)?;
    writeln!(out, "examples:")?;
    writeln!(out, "  chat \"Explain how pi is calculated.\"")?;
    writeln!(out, "  chat \"Explain the following code: $(cat index.js)\"")?;
    writeln!(
        out,
        "  chat \"$(cat << EOF \n\tExplain the difference between ' and \" in javascript. \n\tEOF \n\t)\""
    )?;
    writeln!(out, "  git diff | chat -r 0")?;
    out.flush()
}
