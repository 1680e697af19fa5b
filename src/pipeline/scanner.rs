use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Captures;
use tracing::{debug, info, warn};

use super::registry::{Pattern, Registry};

/// One extracted match plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Tag and capture names mapped to matched text, lossily decoded.
    pub fields: HashMap<String, String>,
    /// The full trimmed line the match came from, as read from disk.
    pub source: Vec<u8>,
    pub file: PathBuf,
    /// Index of the scan pass (one per input argument) that produced this record.
    pub scan: usize,
    /// 1-based line number within the file.
    pub line: usize,
}

/// Mutable state accumulated across every file of one run.
#[derive(Debug, Default)]
pub struct ScanState {
    /// One list per registry pattern, in registry order.
    pub lists: Vec<Vec<Record>>,
    /// Identity keys seen by unique patterns: (match text, full raw line).
    pub uniques: HashSet<(String, Vec<u8>)>,
    /// Every path that was opened and scanned, in scan order.
    pub scanned: Vec<PathBuf>,
}

impl ScanState {
    pub fn new(patterns: usize) -> Self {
        Self {
            lists: vec![Vec::new(); patterns],
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub lines: usize,
    pub records: usize,
    pub duplicates: usize,
}

#[derive(Debug, PartialEq, Eq)]
enum LineOutcome {
    NoMatch,
    Accepted,
    Duplicate,
}

/// Scan one input file. A file that cannot be opened is skipped with a warning.
pub fn scan_path(registry: &Registry, state: &mut ScanState, path: &Path) -> Result<Option<ScanStats>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            return Ok(None);
        }
    };
    info!("Parsing input file {}", path.display());
    let stats = scan_reader(registry, state, path, BufReader::new(file))?;
    info!(
        "{}: {} lines, {} records, {} duplicates",
        path.display(),
        stats.lines,
        stats.records,
        stats.duplicates
    );
    Ok(Some(stats))
}

/// Lines are read as raw bytes. Invalid UTF-8 is matched as U+FFFD but kept
/// verbatim in `Record::source`.
pub fn scan_reader<R: BufRead>(
    registry: &Registry,
    state: &mut ScanState,
    path: &Path,
    mut reader: R,
) -> Result<ScanStats> {
    let scan = state.scanned.len();
    state.scanned.push(path.to_path_buf());

    let mut stats = ScanStats::default();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("failed reading {}", path.display()))?;
        if n == 0 {
            break;
        }
        stats.lines += 1;
        let text = buf.trim_ascii();
        if text.is_empty() {
            continue;
        }
        match scan_line(registry, state, text, path, scan, stats.lines) {
            LineOutcome::Accepted => stats.records += 1,
            LineOutcome::Duplicate => stats.duplicates += 1,
            LineOutcome::NoMatch => {}
        }
    }
    Ok(stats)
}

/// Test patterns in registry order; the first pattern that matches claims the line.
fn scan_line(
    registry: &Registry,
    state: &mut ScanState,
    raw: &[u8],
    path: &Path,
    scan: usize,
    line: usize,
) -> LineOutcome {
    let text = String::from_utf8_lossy(raw);
    for (id, pattern) in registry.iter().enumerate() {
        // Only the leftmost match on the line is used.
        let Some(caps) = pattern.regex.captures(&text) else {
            continue;
        };
        let whole = caps.get(0).map_or("", |m| m.as_str());

        if pattern.unique {
            let key = (whole.to_string(), raw.to_vec());
            if state.uniques.contains(&key) {
                warn!("Row must be unique, but duplicate found: {} ({}:{})", text, path.display(), line);
                return LineOutcome::Duplicate;
            }
            state.uniques.insert(key);
        }

        let record = build_record(pattern, &caps, raw, path, scan, line);
        debug!(
            tag = %pattern.tag,
            regex = %pattern.regex,
            fields = %serde_json::to_string(&record.fields).unwrap_or_default(),
            "matched {}",
            text
        );
        state.lists[id].push(record);
        return LineOutcome::Accepted;
    }
    LineOutcome::NoMatch
}

fn build_record(
    pattern: &Pattern,
    caps: &Captures<'_>,
    raw: &[u8],
    path: &Path,
    scan: usize,
    line: usize,
) -> Record {
    let group = |i: usize| caps.get(i).map_or("", |m| m.as_str()).to_string();
    let mut fields = HashMap::with_capacity(pattern.captures.len() + 1);
    fields.insert(pattern.tag.clone(), group(0));
    for (i, name) in pattern.captures.iter().enumerate() {
        fields.insert(name.clone(), group(i + 1));
    }
    Record {
        fields,
        source: raw.to_vec(),
        file: path.to_path_buf(),
        scan,
        line,
    }
}
