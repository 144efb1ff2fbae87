//! Ignore-pattern resolution.
//!
//! Builds the effective ignore rule set for one scan: built-in
//! defaults, caller-supplied patterns, and the project's `.gitignore`,
//! layered over a small hard-coded blocklist of directory names that
//! are pruned unconditionally.
//!
//! Ordering matters because gitignore matching is last-match-wins:
//! rules are compiled as defaults, then caller patterns, then
//! ignore-file lines, so a `!pattern` in the project's `.gitignore`
//! can whitelist something a default would have excluded. The
//! blocklists and the caller-pattern fast path run before the
//! gitignore set and are not negatable.

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::Match;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where an ignore rule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSource {
    /// Built-in default, always active.
    Default,
    /// A line from the project's ignore file.
    IgnoreFile,
    /// Supplied by the caller (e.g. `-i` on the command line).
    Custom,
}

/// A single ignore pattern plus its provenance. Immutable once parsed.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    pub pattern: String,
    pub source: RuleSource,
}

/// The always-active ignore configuration, passed explicitly into
/// [`IgnoreSet::build`] so multiple scans with different defaults can
/// run without sharing module-level state.
#[derive(Debug, Clone)]
pub struct ScanDefaults {
    /// Gitignore-syntax patterns compiled into the rule set.
    pub patterns: Vec<String>,

    /// Directory names pruned unconditionally wherever they appear as
    /// a path segment, regardless of pattern matching.
    pub pruned_dirs: Vec<String>,

    /// Dot-file names rejected by exact file-name match before any
    /// pattern is consulted (OS metadata, local secrets).
    pub blocked_files: Vec<String>,
}

impl ScanDefaults {
    /// The standard defaults: version-control metadata, dependency and
    /// build directories, compiled artifacts, secrets, editor settings,
    /// and database/log extensions.
    pub fn standard() -> Self {
        let patterns = [
            ".git/",
            "node_modules/",
            "__pycache__/",
            ".DS_Store",
            "*.pyc",
            "*.pyo",
            "*.pyd",
            "*.log",
            ".env",
            "dist/",
            "build/",
            "target/",
            ".venv/",
            "*.egg-info/",
            ".coverage",
            "htmlcov/",
            ".pytest_cache/",
            ".mypy_cache/",
            ".tox/",
            ".idea/",
            ".vscode/",
            "*.sqlite3",
            "*.db",
            "coverage/",
            ".firebase/",
            "*.map",
            "*.min.js",
            "*.exe",
            "*.dll",
            "*.so",
            "*.dylib",
            "*.class",
            "*.o",
            "*.pem",
        ];
        let pruned_dirs = [
            ".git",
            "node_modules",
            "__pycache__",
            ".venv",
            ".pytest_cache",
            ".mypy_cache",
            ".idea",
            ".vscode",
            "dist",
            "build",
            "target",
            ".firebase",
        ];
        let blocked_files = [".DS_Store", ".env", ".coverage"];

        Self {
            patterns: patterns.iter().map(|s| s.to_string()).collect(),
            pruned_dirs: pruned_dirs.iter().map(|s| s.to_string()).collect(),
            blocked_files: blocked_files.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// No defaults at all. Mostly useful in tests.
    pub fn empty() -> Self {
        Self {
            patterns: vec![],
            pruned_dirs: vec![],
            blocked_files: vec![],
        }
    }
}

impl Default for ScanDefaults {
    fn default() -> Self {
        Self::standard()
    }
}

/// Caller-supplied patterns get a fast path with looser semantics than
/// gitignore: exact file-name equality, substring-in-file-name, a glob
/// against the file name only, or directory-name equality for patterns
/// ending in `/`.
#[derive(Debug)]
struct CustomPatterns {
    names: Vec<String>,
    dir_names: Vec<String>,
    globs: GlobSet,
}

impl CustomPatterns {
    fn compile(patterns: &[String]) -> Self {
        let mut names = Vec::new();
        let mut dir_names = Vec::new();
        let mut glob_builder = GlobSetBuilder::new();

        for pattern in patterns {
            if let Some(dir) = pattern.strip_suffix('/') {
                dir_names.push(dir.to_string());
            } else if pattern.contains('*') {
                match Glob::new(pattern) {
                    Ok(glob) => {
                        glob_builder.add(glob);
                    }
                    Err(e) => warn!("Skipping invalid ignore glob '{}': {}", pattern, e),
                }
            } else {
                names.push(pattern.clone());
            }
        }

        let globs = glob_builder.build().unwrap_or_else(|e| {
            warn!("Failed to compile ignore globs: {}", e);
            GlobSet::empty()
        });

        Self {
            names,
            dir_names,
            globs,
        }
    }

    fn is_empty(&self) -> bool {
        self.names.is_empty() && self.dir_names.is_empty() && self.globs.is_empty()
    }

    fn matches(&self, file_name: &str, segments: &[String], is_dir: bool) -> bool {
        if self
            .names
            .iter()
            .any(|n| file_name == n || file_name.contains(n.as_str()))
        {
            return true;
        }

        if self.globs.is_match(file_name) {
            return true;
        }

        // Directory patterns match any ancestor segment. The final
        // segment only counts when the entry is itself a directory, so
        // `logs/` never matches a plain file named `logs`.
        let ancestors = if is_dir {
            segments
        } else {
            &segments[..segments.len().saturating_sub(1)]
        };
        self.dir_names
            .iter()
            .any(|d| ancestors.iter().any(|s| s == d))
    }
}

/// The ordered, immutable collection of active ignore rules for one
/// scan, plus the unconditional blocklists. Built once, then consulted
/// per-entry by the walker.
#[derive(Debug)]
pub struct IgnoreSet {
    root: PathBuf,
    rules: Vec<IgnoreRule>,
    matcher: Option<Gitignore>,
    custom: CustomPatterns,
    pruned_dirs: Vec<String>,
    blocked_files: Vec<String>,
}

impl IgnoreSet {
    /// Builds the effective rule set for `root`.
    ///
    /// Reads `<root>/.gitignore` if present; blank lines and `#`
    /// comments are discarded. This never fails: a missing or
    /// unreadable ignore file contributes nothing, and unparsable
    /// patterns are logged and skipped.
    pub fn build(root: impl AsRef<Path>, defaults: &ScanDefaults, extra_patterns: &[String]) -> Self {
        let root = root.as_ref().to_path_buf();

        let mut rules: Vec<IgnoreRule> = defaults
            .patterns
            .iter()
            .map(|p| IgnoreRule {
                pattern: p.clone(),
                source: RuleSource::Default,
            })
            .collect();

        rules.extend(extra_patterns.iter().map(|p| IgnoreRule {
            pattern: p.clone(),
            source: RuleSource::Custom,
        }));

        let gitignore_path = root.join(".gitignore");
        match fs::read_to_string(&gitignore_path) {
            Ok(content) => {
                for line in content.lines() {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    rules.push(IgnoreRule {
                        pattern: line.to_string(),
                        source: RuleSource::IgnoreFile,
                    });
                }
            }
            Err(e) => {
                debug!("No ignore file at {}: {}", gitignore_path.display(), e);
            }
        }

        let mut builder = GitignoreBuilder::new(&root);
        for rule in &rules {
            if let Err(e) = builder.add_line(None, &rule.pattern) {
                warn!("Skipping unparsable ignore pattern '{}': {}", rule.pattern, e);
            }
        }
        let matcher = match builder.build() {
            Ok(gitignore) => Some(gitignore),
            Err(e) => {
                warn!("Failed to build gitignore matcher: {}", e);
                None
            }
        };

        let custom = CustomPatterns::compile(extra_patterns);

        info!(
            "Resolved {} ignore rules for {} ({} default, {} custom, {} from ignore file)",
            rules.len(),
            root.display(),
            rules.iter().filter(|r| r.source == RuleSource::Default).count(),
            rules.iter().filter(|r| r.source == RuleSource::Custom).count(),
            rules.iter().filter(|r| r.source == RuleSource::IgnoreFile).count(),
        );

        Self {
            root,
            rules,
            matcher,
            custom,
            pruned_dirs: defaults.pruned_dirs.clone(),
            blocked_files: defaults.blocked_files.clone(),
        }
    }

    /// The assembled rule list, in matching order.
    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    /// The scan root this set was built for.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Decides whether an entry is excluded from the scan.
    ///
    /// `path` is the entry's path under the scan root; `is_dir` says
    /// whether it is a directory, which lets directory-only patterns
    /// (trailing `/`) match. Matching is case-sensitive. The checks
    /// run in order:
    ///
    /// 1. blocked dot-file names (exact file-name match)
    /// 2. hard-coded pruned directory names, anywhere in the path
    /// 3. caller-supplied patterns
    /// 4. the gitignore-style rule set (last match wins, `!` negation
    ///    honored)
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self.blocked_files.iter().any(|b| *b == file_name) {
            return true;
        }

        // A path outside the root (e.g. cross-volume) can't be matched
        // by relative-path rules, but the segment blocklist still applies.
        let rel = self.relative(path);
        let segments: Vec<String> = match &rel {
            Some(r) if r.is_empty() => return false, // the root itself
            Some(r) => r.split('/').map(String::from).collect(),
            None => path
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect(),
        };

        if segments
            .iter()
            .any(|s| self.pruned_dirs.iter().any(|d| d == s))
        {
            return true;
        }

        let Some(rel) = rel else {
            return false;
        };

        if !self.custom.is_empty() && self.custom.matches(&file_name, &segments, is_dir) {
            return true;
        }

        if let Some(matcher) = &self.matcher {
            match matcher.matched(&rel, is_dir) {
                Match::Ignore(_) => return true,
                Match::Whitelist(_) | Match::None => {}
            }
        }

        false
    }

    /// Root-relative path with forward-slash separators, regardless of
    /// host conventions. None if the path is not under the root.
    fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}
