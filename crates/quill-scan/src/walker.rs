//! Directory scanning.
//!
//! Walks a directory tree, pruning ignored directories before
//! descending, and reads the surviving files into one bounded text
//! digest for downstream prompt assembly.
//!
//! Traversal is depth-first pre-order with siblings sorted
//! lexicographically by file name, so two scans of an unmodified tree
//! produce byte-identical digests.

use crate::error::{Result, ScanError};
use crate::observer::{NullObserver, ScanObserver};
use crate::rules::{IgnoreSet, ScanDefaults};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Files larger than this are noted by size only, never opened for a
/// full read.
pub const MAX_FILE_BYTES: u64 = 5_000_000;

/// How many leading bytes are sniffed for the binary check.
pub const BINARY_SNIFF_BYTES: usize = 1024;

/// Decoded content longer than this is cut off with a visible marker.
pub const MAX_CONTENT_CHARS: usize = 5_000;

/// Options for a directory scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// The always-active ignore configuration.
    pub defaults: ScanDefaults,

    /// Extra ignore patterns supplied by the caller.
    pub extra_ignores: Vec<String>,

    /// Pipeline-level cap on how many files are processed. Applied by
    /// truncating the sorted file list, never by changing ignore
    /// semantics.
    pub max_files: Option<usize>,

    /// Follow symbolic links when walking. Off by default; when
    /// enabled, walkdir's ancestor check guards against link cycles.
    pub follow_symlinks: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            defaults: ScanDefaults::standard(),
            extra_ignores: vec![],
            max_files: None,
            follow_symlinks: false,
        }
    }
}

/// Per-file decision, produced and consumed within one walk pass.
enum FileOutcome {
    /// Readable text, already truncated if necessary.
    Text(String),
    /// Null byte in the sniffed sample.
    Binary,
    /// Over the byte threshold; carries the stat'd size.
    TooLarge(u64),
    /// Read failed; carries the error message.
    Unreadable(String),
}

/// Result of scanning a directory.
pub struct ScanResult {
    /// The assembled digest.
    pub digest: String,

    /// Entries that made it into the digest (including placeholders).
    pub files_scanned: usize,

    /// Files whose text content was included.
    pub files_read: usize,

    /// Files skipped as binary.
    pub files_binary: usize,

    /// Files skipped for size.
    pub files_too_large: usize,

    /// Time taken in milliseconds.
    pub duration_ms: u64,

    /// Files that failed to read, as (relative path, message) pairs.
    pub errors: Vec<(String, String)>,
}

/// Scans a directory into a text digest.
///
/// Resolves the ignore rule set for `root`, walks the tree with
/// ignored directories pruned entirely, and reads each surviving file
/// subject to the size, binary, and truncation rules.
///
/// Only two failures abort the scan: the root itself being
/// inaccessible, and zero files surviving the ignore filter. Per-file
/// read errors become inline placeholders.
///
/// # Example
///
/// ```no_run
/// use quill_scan::{scan_directory, ScanOptions};
/// use std::path::Path;
///
/// let result = scan_directory(Path::new("."), &ScanOptions::default()).unwrap();
/// println!("{} files in {}ms", result.files_scanned, result.duration_ms);
/// ```
pub fn scan_directory(root: &Path, options: &ScanOptions) -> Result<ScanResult> {
    scan_directory_with_observer(root, options, &NullObserver)
}

/// Like [`scan_directory`], but emits a per-file event to `observer`
/// before each file is processed.
pub fn scan_directory_with_observer(
    root: &Path,
    options: &ScanOptions,
    observer: &dyn ScanObserver,
) -> Result<ScanResult> {
    let start = Instant::now();

    // Anything below the root is recoverable; the root itself is not.
    fs::read_dir(root).map_err(|e| ScanError::root(root, e))?;

    let ignore_set = IgnoreSet::build(root, &options.defaults, &options.extra_ignores);

    info!("Starting scan of {}", root.display());

    let mut files: Vec<(PathBuf, String)> = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(options.follow_symlinks)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !ignore_set.is_ignored(e.path(), e.file_type().is_dir()));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match relative_path(root, entry.path()) {
            Some(rel) => files.push((entry.into_path(), rel)),
            None => debug!("Skipping entry outside root: {}", entry.path().display()),
        }
    }

    if let Some(cap) = options.max_files {
        if files.len() > cap {
            debug!("Capping scan at {} of {} files", cap, files.len());
            files.truncate(cap);
        }
    }

    if files.is_empty() {
        return Err(ScanError::NoReadableFiles(root.to_path_buf()));
    }

    let total = files.len();
    let mut digest = String::new();
    let mut files_read = 0;
    let mut files_binary = 0;
    let mut files_too_large = 0;
    let mut errors = Vec::new();

    for (index, (path, rel)) in files.iter().enumerate() {
        observer.on_file(rel, index, total);

        digest.push_str(&format!("--- {} ---\n", rel));
        match read_file(path) {
            FileOutcome::Text(content) => {
                files_read += 1;
                digest.push_str(&content);
                if !content.ends_with('\n') {
                    digest.push('\n');
                }
            }
            FileOutcome::Binary => {
                files_binary += 1;
                digest.push_str("(binary file, skipped)\n");
            }
            FileOutcome::TooLarge(size) => {
                files_too_large += 1;
                digest.push_str(&format!("(file too large: {} bytes, skipped)\n", size));
            }
            FileOutcome::Unreadable(msg) => {
                warn!("Failed to read {}: {}", rel, msg);
                digest.push_str(&format!("(could not read {}: {})\n", rel, msg));
                errors.push((rel.clone(), msg));
            }
        }
        digest.push('\n');
    }

    let duration = start.elapsed();

    info!(
        "Scanned {} files ({} read, {} binary, {} too large, {} unreadable) in {:?}",
        total,
        files_read,
        files_binary,
        files_too_large,
        errors.len(),
        duration
    );

    Ok(ScanResult {
        digest,
        files_scanned: total,
        files_read,
        files_binary,
        files_too_large,
        duration_ms: duration.as_millis() as u64,
        errors,
    })
}

/// Reads one file into its digest outcome. Never panics and never
/// propagates: every failure becomes `Unreadable`.
fn read_file(path: &Path) -> FileOutcome {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => return FileOutcome::Unreadable(e.to_string()),
    };

    if size > MAX_FILE_BYTES {
        return FileOutcome::TooLarge(size);
    }

    if sniff_binary(path) {
        return FileOutcome::Binary;
    }

    match fs::read(path) {
        Ok(bytes) => {
            // Lossy decode: invalid byte sequences become replacement
            // characters instead of aborting the scan.
            let content = String::from_utf8_lossy(&bytes).into_owned();
            FileOutcome::Text(truncate_content(content))
        }
        Err(e) => FileOutcome::Unreadable(e.to_string()),
    }
}

/// Checks the leading bytes for a null byte. A sniff failure is not
/// fatal; the caller falls through to the text path.
fn sniff_binary(path: &Path) -> bool {
    let mut sample = [0u8; BINARY_SNIFF_BYTES];
    let mut file = match fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };
    match file.read(&mut sample) {
        Ok(n) => sample[..n].contains(&0),
        Err(_) => false,
    }
}

/// Cuts content off at the character threshold with a visible marker.
fn truncate_content(content: String) -> String {
    match content.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((byte_idx, _)) => {
            let mut truncated = content[..byte_idx].to_string();
            truncated.push_str("\n... (truncated)");
            truncated
        }
        None => content,
    }
}

/// Root-relative path with forward slashes, for headers and matching.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_scan_empty_directory_is_a_failure() {
        let dir = tempdir().unwrap();
        let result = scan_directory(dir.path(), &ScanOptions::default());
        assert!(matches!(result, Err(ScanError::NoReadableFiles(_))));
    }

    #[test]
    fn test_scan_missing_root_is_fatal() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let result = scan_directory(&missing, &ScanOptions::default());
        assert!(matches!(result, Err(ScanError::RootAccess { .. })));
    }

    #[test]
    fn test_scan_respects_gitignore_and_prunes_directories() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        fs::write(dir.path().join("c.log"), "ignore me").unwrap();
        fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/b.js"), "x").unwrap();

        let result = scan_directory(dir.path(), &ScanOptions::default()).unwrap();

        assert!(result.digest.contains("--- a.txt ---\nhello"));
        assert!(!result.digest.contains("b.js"));
        assert!(!result.digest.contains("c.log"));
        assert!(!result.digest.contains("ignore me"));
    }

    #[test]
    fn test_pruned_directory_descendants_never_appear() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("keep.txt"), "kept").unwrap();
        fs::create_dir_all(dir.path().join(".git/objects/ab")).unwrap();
        fs::write(dir.path().join(".git/objects/ab/cdef"), "blob").unwrap();
        fs::create_dir_all(dir.path().join("vendor/node_modules/pkg")).unwrap();
        fs::write(dir.path().join("vendor/node_modules/pkg/index.js"), "js").unwrap();

        let result = scan_directory(dir.path(), &ScanOptions::default()).unwrap();

        assert!(result.digest.contains("--- keep.txt ---"));
        assert!(!result.digest.contains("cdef"));
        assert!(!result.digest.contains("index.js"));
        assert_eq!(result.files_scanned, 1);
    }

    #[test]
    fn test_extra_ignore_pattern_is_exact_not_prefix() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("temp.txt"), "a").unwrap();
        fs::write(dir.path().join("temp2.txt"), "b").unwrap();

        let options = ScanOptions {
            extra_ignores: vec!["temp.txt".to_string()],
            ..ScanOptions::default()
        };
        let result = scan_directory(dir.path(), &options).unwrap();

        assert!(!result.digest.contains("--- temp.txt ---"));
        assert!(result.digest.contains("--- temp2.txt ---"));
    }

    #[test]
    fn test_binary_file_gets_placeholder() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("blob.dat"), b"ELF\x00\x01\x02payload").unwrap();

        let result = scan_directory(dir.path(), &ScanOptions::default()).unwrap();

        assert!(result
            .digest
            .contains("--- blob.dat ---\n(binary file, skipped)"));
        assert!(!result.digest.contains("payload"));
        assert_eq!(result.files_binary, 1);
        assert_eq!(result.files_read, 0);
    }

    #[test]
    fn test_oversized_file_is_stat_only() {
        let dir = tempdir().unwrap();
        // Sparse file: the size check must happen before any read.
        let file = fs::File::create(dir.path().join("huge.txt")).unwrap();
        file.set_len(MAX_FILE_BYTES + 1).unwrap();
        fs::write(dir.path().join("small.txt"), "ok").unwrap();

        let result = scan_directory(dir.path(), &ScanOptions::default()).unwrap();

        assert!(result.digest.contains(&format!(
            "--- huge.txt ---\n(file too large: {} bytes, skipped)",
            MAX_FILE_BYTES + 1
        )));
        assert!(result.digest.contains("--- small.txt ---\nok"));
        assert_eq!(result.files_too_large, 1);
    }

    #[test]
    fn test_long_content_is_truncated_with_marker() {
        let dir = tempdir().unwrap();
        let long = "x".repeat(MAX_CONTENT_CHARS + 500);
        fs::write(dir.path().join("long.txt"), &long).unwrap();

        let result = scan_directory(dir.path(), &ScanOptions::default()).unwrap();

        assert!(result.digest.contains("... (truncated)"));
        assert!(!result.digest.contains(&long));
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let dir = tempdir().unwrap();
        // Invalid UTF-8 but no null byte, so it takes the text path.
        fs::write(dir.path().join("latin1.txt"), b"caf\xe9 ole").unwrap();

        let result = scan_directory(dir.path(), &ScanOptions::default()).unwrap();

        assert_eq!(result.files_read, 1);
        assert!(result.digest.contains("caf"));
        assert!(result.digest.contains("ole"));
    }

    #[test]
    fn test_scan_order_is_deterministic_and_sorted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "2").unwrap();
        fs::write(dir.path().join("a.txt"), "1").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/z.txt"), "3").unwrap();

        let first = scan_directory(dir.path(), &ScanOptions::default()).unwrap();
        let second = scan_directory(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(first.digest, second.digest);

        let a = first.digest.find("--- a.txt ---").unwrap();
        let b = first.digest.find("--- b.txt ---").unwrap();
        let z = first.digest.find("--- sub/z.txt ---").unwrap();
        assert!(a < b);
        assert!(b < z);
    }

    #[test]
    fn test_max_files_caps_the_sorted_list() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "1").unwrap();
        fs::write(dir.path().join("b.txt"), "2").unwrap();
        fs::write(dir.path().join("c.txt"), "3").unwrap();

        let options = ScanOptions {
            max_files: Some(2),
            ..ScanOptions::default()
        };
        let result = scan_directory(dir.path(), &options).unwrap();

        assert_eq!(result.files_scanned, 2);
        assert!(result.digest.contains("--- a.txt ---"));
        assert!(result.digest.contains("--- b.txt ---"));
        assert!(!result.digest.contains("--- c.txt ---"));
    }

    #[test]
    fn test_observer_sees_every_file_in_order() {
        use std::sync::Mutex;

        struct Recorder(Mutex<Vec<(String, usize, usize)>>);
        impl ScanObserver for Recorder {
            fn on_file(&self, rel_path: &str, index: usize, total: usize) {
                self.0
                    .lock()
                    .unwrap()
                    .push((rel_path.to_string(), index, total));
            }
        }

        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "1").unwrap();
        fs::write(dir.path().join("b.txt"), "2").unwrap();

        let recorder = Recorder(Mutex::new(vec![]));
        scan_directory_with_observer(dir.path(), &ScanOptions::default(), &recorder).unwrap();

        let events = recorder.0.into_inner().unwrap();
        assert_eq!(
            events,
            vec![
                ("a.txt".to_string(), 0, 2),
                ("b.txt".to_string(), 1, 2),
            ]
        );
    }

    /// Helper to create a directory symlink cross-platform.
    /// Returns None if symlink creation fails (e.g., no privileges on Windows).
    fn create_dir_symlink(original: &Path, link: &Path) -> Option<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(original, link).ok()
        }
        #[cfg(windows)]
        {
            std::os::windows::fs::symlink_dir(original, link).ok()
        }
        #[cfg(not(any(unix, windows)))]
        {
            None
        }
    }

    #[test]
    fn test_scan_does_not_follow_symlinks_by_default() {
        let dir = tempdir().unwrap();
        let linked_dir = tempdir().unwrap();

        fs::write(dir.path().join("here.txt"), "here").unwrap();
        fs::write(linked_dir.path().join("there.txt"), "there").unwrap();

        let symlink_path = dir.path().join("linked");
        if create_dir_symlink(linked_dir.path(), &symlink_path).is_none() {
            return;
        }

        let result = scan_directory(dir.path(), &ScanOptions::default()).unwrap();
        assert!(result.digest.contains("here.txt"));
        assert!(!result.digest.contains("there.txt"));
    }

    #[test]
    fn test_scan_follows_symlinks_when_enabled() {
        let dir = tempdir().unwrap();
        let linked_dir = tempdir().unwrap();

        fs::write(dir.path().join("here.txt"), "here").unwrap();
        fs::write(linked_dir.path().join("there.txt"), "there").unwrap();

        let symlink_path = dir.path().join("linked");
        if create_dir_symlink(linked_dir.path(), &symlink_path).is_none() {
            return;
        }

        let options = ScanOptions {
            follow_symlinks: true,
            ..ScanOptions::default()
        };
        let result = scan_directory(dir.path(), &options).unwrap();
        assert!(result.digest.contains("linked/there.txt"));
    }
}
