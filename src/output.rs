use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, TimeZone};

/// `Result_<rfc3339>.txt` with colons swapped for dots so the name is valid everywhere.
pub fn result_file_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let stamp = now.to_rfc3339_opts(SecondsFormat::Secs, true).replace(':', ".");
    format!("Result_{}.txt", stamp)
}

pub fn write_result(dir: &Path, contents: &str) -> Result<PathBuf> {
    let path = dir.join(result_file_name(&chrono::Local::now()));
    std::fs::write(&path, contents)
        .with_context(|| format!("failed to write result {}", path.display()))?;
    Ok(path)
}
