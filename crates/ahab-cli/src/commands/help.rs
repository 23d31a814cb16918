//! Help handling for commands whose flags go straight to the runtime.
//!
//! Those commands disable clap's own flag parsing, so `-h`/`--help` shows
//! up as an ordinary token and is caught here before anything is loaded
//! or spawned.

use std::io::{self, Write};

fn is_help_flag(token: &str) -> bool {
    matches!(token, "-h" | "--help")
}

/// Prints `help` and returns `true` if the first token is a help flag.
///
/// The flag is removed from `tokens`. Otherwise `tokens` is left as is and
/// `false` is returned.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn intercept<W: Write + ?Sized>(
    tokens: &mut Vec<String>,
    help: &str,
    out: &mut W,
) -> io::Result<bool> {
    if !tokens.first().is_some_and(|t| is_help_flag(t)) {
        return Ok(false);
    }
    let _ = tokens.remove(0);
    out.write_all(help.as_bytes())?;
    out.flush()?;
    Ok(true)
}
