use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::scanner::Record;

/// Written in place of an input file that had no matched lines.
pub const PLACEHOLDER: &[u8] = b" ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWriteback {
    pub path: PathBuf,
    /// Matched lines exactly as read, without line terminators.
    pub lines: Vec<Vec<u8>>,
}

impl FileWriteback {
    pub fn contents(&self) -> Vec<u8> {
        if self.lines.is_empty() {
            PLACEHOLDER.to_vec()
        } else {
            self.lines.join(&b'\n')
        }
    }
}

/// Group every matched source line by its file, composed or not.
/// Files keep first-scanned order and lines keep scan order.
pub fn collect(scanned: &[PathBuf], lists: &[Vec<Record>]) -> Vec<FileWriteback> {
    let mut by_file: HashMap<&Path, Vec<&Record>> = HashMap::with_capacity(scanned.len());
    let mut order: Vec<&Path> = Vec::with_capacity(scanned.len());
    for path in scanned {
        if !by_file.contains_key(path.as_path()) {
            by_file.insert(path, Vec::new());
            order.push(path);
        }
    }
    for record in lists.iter().flatten() {
        if let Some(records) = by_file.get_mut(record.file.as_path()) {
            records.push(record);
        }
    }

    order
        .into_iter()
        .map(|path| {
            let mut records = by_file.remove(path).unwrap_or_default();
            records.sort_by_key(|r| (r.scan, r.line));
            FileWriteback {
                path: path.to_path_buf(),
                lines: records.into_iter().map(|r| r.source.clone()).collect(),
            }
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WritebackStats {
    pub written: usize,
    pub failed: usize,
}

/// Overwrite each input file. A failed write is logged and skipped.
pub fn write_all(plan: &[FileWriteback]) -> WritebackStats {
    let mut stats = WritebackStats::default();
    for fw in plan {
        match std::fs::write(&fw.path, fw.contents()) {
            Ok(()) => {
                info!("Rewrote {} with {} matched lines", fw.path.display(), fw.lines.len());
                stats.written += 1;
            }
            Err(e) => {
                warn!("Failed to rewrite {}: {}", fw.path.display(), e);
                stats.failed += 1;
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(plan: &FileWriteback) -> Vec<String> {
        plan.lines.iter().map(|l| String::from_utf8_lossy(l).into_owned()).collect()
    }

    fn rec(file: &str, scan: usize, line: usize, source: &str) -> Record {
        Record {
            fields: HashMap::new(),
            source: source.as_bytes().to_vec(),
            file: PathBuf::from(file),
            scan,
            line,
        }
    }

    #[test]
    fn groups_by_file_in_scan_order() {
        let scanned = vec![PathBuf::from("a"), PathBuf::from("b")];
        let lists = vec![
            vec![rec("a", 0, 3, "a3"), rec("b", 1, 1, "b1")],
            vec![rec("a", 0, 1, "a1")],
        ];
        let plan = collect(&scanned, &lists);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].path, PathBuf::from("a"));
        assert_eq!(lines(&plan[0]), vec!["a1", "a3"]);
        assert_eq!(lines(&plan[1]), vec!["b1"]);
    }

    #[test]
    fn unmatched_file_gets_placeholder() {
        let scanned = vec![PathBuf::from("empty")];
        let plan = collect(&scanned, &[vec![]]);
        assert_eq!(plan.len(), 1);
        assert!(plan[0].lines.is_empty());
        assert_eq!(plan[0].contents(), PLACEHOLDER);
    }

    #[test]
    fn repeated_path_written_once() {
        let scanned = vec![PathBuf::from("a"), PathBuf::from("a")];
        let lists = vec![vec![rec("a", 1, 1, "second"), rec("a", 0, 2, "first")]];
        let plan = collect(&scanned, &lists);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].contents(), b"first\nsecond");
    }

    #[test]
    fn writes_files_and_counts_failures() {
        let dir = tempfile::tempdir().unwrap();
        let ok = dir.path().join("ok.txt");
        let bad = dir.path().join("missing-dir").join("x.txt");
        let plan = vec![
            FileWriteback { path: ok.clone(), lines: vec![b"one".to_vec(), b"two".to_vec()] },
            FileWriteback { path: bad, lines: vec![] },
        ];
        let stats = write_all(&plan);
        assert_eq!(stats, WritebackStats { written: 1, failed: 1 });
        assert_eq!(std::fs::read_to_string(ok).unwrap(), "one\ntwo");
    }

    #[test]
    fn records_from_unscanned_files_are_ignored() {
        let scanned = vec![PathBuf::from("a")];
        let lists = vec![vec![rec("a", 0, 1, "a1"), rec("elsewhere", 0, 1, "x")]];
        let plan = collect(&scanned, &lists);
        assert_eq!(plan.len(), 1);
        assert_eq!(lines(&plan[0]), vec!["a1"]);
    }

    #[test]
    fn non_utf8_lines_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin.txt");
        let plan = vec![FileWriteback {
            path: path.clone(),
            lines: vec![b"NAME:Jos\xe9".to_vec(), b"NAME:Bob".to_vec()],
        }];
        write_all(&plan);
        assert_eq!(std::fs::read(path).unwrap(), b"NAME:Jos\xe9\nNAME:Bob");
    }
}
