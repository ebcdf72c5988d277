use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Context;
use tracing::debug;

/// Asks whether an existing file may be overwritten.
///
/// Returns `true` straight away when nothing exists at `path`. Only an
/// explicit `y`/`yes` counts as consent; EOF declines.
pub fn confirm_overwrite<R: BufRead, W: Write>(
    path: &Path,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<bool> {
    if !path.is_file() {
        return Ok(true);
    }

    debug!(path = %path.display(), "output file already exists");
    writeln!(output, "File already exists @ {}.", path.display())?;
    write!(output, "Do you want to overwrite the file? [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read overwrite confirmation")?;

    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Runs `write` unless `path` exists and the user declines to overwrite it.
///
/// Returns `None` when the write was skipped.
pub fn write_guarded<R, W, F, T>(
    path: &Path,
    assume_yes: bool,
    input: &mut R,
    output: &mut W,
    write: F,
) -> anyhow::Result<Option<T>>
where
    R: BufRead,
    W: Write,
    F: FnOnce() -> anyhow::Result<T>,
{
    if !assume_yes && !confirm_overwrite(path, input, output)? {
        return Ok(None);
    }
    write().map(Some)
}
