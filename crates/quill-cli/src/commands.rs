//! CLI command implementation.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use quill_gen::{generate_readme, GeminiClient, Language};
use quill_scan::{scan_directory_with_observer, ScanError, ScanObserver, ScanOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Progress bar fed by the walker's per-file events. The walker only
/// emits callbacks; all rendering and scheduling lives here.
struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    fn new() -> Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(ProgressStyle::default_bar().template("{bar:30.cyan} {pos}/{len} {msg}")?);
        Ok(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ScanObserver for ProgressObserver {
    fn on_file(&self, rel_path: &str, index: usize, total: usize) {
        if index == 0 {
            self.bar.set_length(total as u64);
        }
        let shown: String = if rel_path.chars().count() > 40 {
            let head: String = rel_path.chars().take(40).collect();
            format!("{head}...")
        } else {
            rel_path.to_string()
        };
        self.bar.set_message(shown);
        self.bar.inc(1);
    }
}

/// Scan the tree, generate the README, and write it out.
pub async fn generate(
    path: &Path,
    output: &Path,
    extra_ignores: Vec<String>,
    max_files: Option<usize>,
    lang: Language,
    follow_symlinks: bool,
) -> Result<()> {
    if !path.exists() {
        return Err(format!("the path '{}' does not exist", path.display()).into());
    }

    let output_path = resolve_output(path, output);

    println!("{} {}", "Analyzing".cyan(), path.display());
    println!("  Output: {}", output_path.display());
    println!("  Language: {}", lang.name().cyan());
    if !extra_ignores.is_empty() {
        println!("  Extra ignores: {}", extra_ignores.join(", "));
    }

    let options = ScanOptions {
        extra_ignores,
        max_files,
        follow_symlinks,
        ..ScanOptions::default()
    };

    let observer = ProgressObserver::new()?;
    let scan = match scan_directory_with_observer(path, &options, &observer) {
        Ok(scan) => {
            observer.finish();
            scan
        }
        Err(e) => {
            observer.finish();
            if matches!(e, ScanError::NoReadableFiles(_)) {
                eprintln!(
                    "{} No readable files found in the specified path.",
                    "⚠ Warning:".yellow()
                );
            }
            return Err(e.into());
        }
    };

    let skipped = scan.files_binary + scan.files_too_large + scan.errors.len();
    let skipped_msg = if skipped > 0 {
        format!(" ({} as placeholders)", skipped)
    } else {
        String::new()
    };
    println!(
        "{} Scanned {} files{} in {}ms",
        "✓".green(),
        scan.files_scanned.to_string().cyan(),
        skipped_msg.dimmed(),
        scan.duration_ms
    );

    if !scan.errors.is_empty() {
        println!("\n{} files with read errors:", "⚠".yellow());
        for (file, error) in scan.errors.iter().take(5) {
            println!("  {} - {}", file.red(), error);
        }
        if scan.errors.len() > 5 {
            println!("  ... and {} more", scan.errors.len() - 5);
        }
    }

    let client = GeminiClient::from_env()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("Generating README in {}...", lang.name()));

    let readme = generate_readme(&client, &scan.digest, lang).await;
    spinner.finish_and_clear();
    let readme = readme?;

    if output_path.exists() {
        println!(
            "{} {} already exists and will be replaced",
            "⚠".yellow(),
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&output_path, &readme)?;

    println!(
        "{} README generated at {}",
        "✓".green(),
        output_path.display()
    );

    Ok(())
}

/// A bare file name (no directory component) resolves into the target
/// directory; anything with a path is taken as given.
fn resolve_output(root: &Path, output: &Path) -> PathBuf {
    let bare = output
        .parent()
        .map(|p| p.as_os_str().is_empty())
        .unwrap_or(true);
    if bare {
        root.join(output)
    } else {
        output.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_output_name_lands_in_target_directory() {
        let resolved = resolve_output(Path::new("/proj"), Path::new("README.md"));
        assert_eq!(resolved, Path::new("/proj/README.md"));

        let explicit = resolve_output(Path::new("/proj"), Path::new("docs/README.md"));
        assert_eq!(explicit, Path::new("docs/README.md"));
    }
}
