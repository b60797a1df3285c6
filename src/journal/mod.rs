pub mod metadata;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use regex::Regex;

pub use metadata::{FieldValue, Record, parse_metadata};

/// Everything one pass over a backups directory produced: the records that
/// parsed, and how many metadata files were skipped as malformed.
#[derive(Debug, Default)]
pub struct Scan {
    pub records: Vec<Record>,
    pub skipped: usize,
}

/// Compiled filename patterns for the backup layout.
struct LayoutPatterns {
    serial_dir: Regex,
    datastore_dir: Regex,
    metadata_file: Regex,
}

impl LayoutPatterns {
    fn new() -> anyhow::Result<Self> {
        Ok(Self {
            serial_dir: Regex::new(r"^[A-Z]{2}")?,
            datastore_dir: Regex::new(r"^datastore-")?,
            metadata_file: Regex::new(r"\.metadata$")?,
        })
    }
}

/// Walk a backups root and parse every record metadata file found.
///
/// Layout (Sugar 0.84 – 0.88 backups): one directory per laptop serial
/// number under the root, each containing a `datastore-*` directory, with
/// the metadata files either directly inside it or under a `store/` level.
/// Entries that do not fit the layout are ignored; malformed metadata files
/// are logged and counted, never fatal.
///
/// # Errors
///
/// Returns an error only when the root itself is missing or unreadable.
pub fn scan_backups(root: &Path, verbose: bool) -> anyhow::Result<Scan> {
    let patterns = LayoutPatterns::new()?;
    let entries = fs::read_dir(root)
        .with_context(|| format!("backups directory not found: {}", root.display()))?;

    let mut serial_dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_dir() && matches_name(p, &patterns.serial_dir))
        .collect();
    serial_dirs.sort();

    let mut scan = Scan::default();
    for serial_dir in serial_dirs {
        let Some(store_dir) = metadata_dir(&serial_dir, &patterns) else {
            if verbose {
                eprintln!(
                    "[journal-stats] no datastore in {}, skipping",
                    serial_dir.display()
                );
            }
            continue;
        };
        if verbose {
            eprintln!("[journal-stats] found journal dir: {}", store_dir.display());
        }
        collect_records(&store_dir, &patterns, verbose, &mut scan);
    }
    Ok(scan)
}

fn matches_name(path: &Path, pattern: &Regex) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| pattern.is_match(n))
}

/// Resolve the metadata directory for one serial directory, which varies
/// across Sugar versions: `[serial]/datastore-[current,latest]`, optionally
/// with a `store/` level below it. Returns `None` when there is no
/// datastore directory at all.
fn metadata_dir(serial_dir: &Path, patterns: &LayoutPatterns) -> Option<PathBuf> {
    let entries = fs::read_dir(serial_dir).ok()?;
    let mut datastore_dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_dir() && matches_name(p, &patterns.datastore_dir))
        .collect();
    datastore_dirs.sort();
    let datastore = datastore_dirs.into_iter().next()?;

    let store = datastore.join("store");
    if store.is_dir() { Some(store) } else { Some(datastore) }
}

/// Parse every `*.metadata` file in one journal directory into `scan`,
/// skipping unreadable or malformed files with a warning.
fn collect_records(dir: &Path, patterns: &LayoutPatterns, verbose: bool, scan: &mut Scan) {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            eprintln!(
                "[journal-stats] warning: cannot read {}: {e}",
                dir.display()
            );
            return;
        }
    };

    let mut metadata_files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && matches_name(p, &patterns.metadata_file))
        .collect();
    metadata_files.sort();

    for path in metadata_files {
        if verbose {
            eprintln!("[journal-stats] processing file: {}", path.display());
        }
        match read_record(&path) {
            Ok(record) => scan.records.push(record),
            Err(e) => {
                eprintln!(
                    "[journal-stats] warning: skipping {}: {e:#}",
                    path.display()
                );
                scan.skipped += 1;
            }
        }
    }
}

fn read_record(path: &Path) -> anyhow::Result<Record> {
    let contents = fs::read_to_string(path).context("failed to read file")?;
    let mut record = parse_metadata(&contents)?;
    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
        record.ensure_uid(stem);
    }
    Ok(record)
}
