//! Quill Scan - ignore-pattern resolution and tree walking
//!
//! This crate handles the file system side of README generation:
//! - Resolving the effective ignore rule set (built-in defaults,
//!   the project's `.gitignore`, and caller-supplied patterns)
//! - Walking the directory tree with ignored directories pruned
//! - Reading file contents into a single bounded text digest
//!
//! # Example
//!
//! ```no_run
//! use quill_scan::{scan_directory, ScanOptions};
//! use std::path::Path;
//!
//! let result = scan_directory(Path::new("."), &ScanOptions::default()).unwrap();
//! println!("Scanned {} files ({} bytes of digest)", result.files_scanned, result.digest.len());
//! ```

pub mod error;
pub mod observer;
pub mod rules;
pub mod walker;

pub use error::{Result, ScanError};
pub use observer::{NullObserver, ScanObserver};
pub use rules::{IgnoreRule, IgnoreSet, RuleSource, ScanDefaults};
pub use walker::{scan_directory, scan_directory_with_observer, ScanOptions, ScanResult};
