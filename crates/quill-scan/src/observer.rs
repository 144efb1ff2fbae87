//! Progress observation.
//!
//! The walker emits a per-file event to a registered listener instead
//! of owning any presentation concern. Listeners do their own
//! scheduling and rendering; traversal never depends on them.

/// Receives per-file progress events during a scan.
///
/// All methods have no-op defaults so implementations only override
/// what they care about.
pub trait ScanObserver {
    /// Called just before a file is processed. `index` is zero-based
    /// and `total` is the size of the (already capped) file list.
    fn on_file(&self, rel_path: &str, index: usize, total: usize) {
        let _ = (rel_path, index, total);
    }
}

/// An observer that ignores everything.
pub struct NullObserver;

impl ScanObserver for NullObserver {}
