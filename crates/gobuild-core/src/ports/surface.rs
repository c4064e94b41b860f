//! Presentation surface port.

use std::path::{Path, PathBuf};

/// An append-only text panel that output is written to.
///
/// Mutated only from the coordinating context, by the output sink that owns
/// it. Implementations do not need internal locking.
pub trait PresentationSurface: Send {
    /// Current content length in characters.
    fn size(&self) -> usize;

    /// Whether the content ends with `suffix`.
    fn ends_with(&self, suffix: &str) -> bool;

    /// Append `text` at the end of the content.
    fn append(&mut self, text: &str);

    /// Remove all content.
    fn clear(&mut self);

    /// Record the directory relative result paths resolve against.
    ///
    /// Annotation only; it never appears in the content.
    fn set_base_dir(&mut self, dir: &Path);

    fn base_dir(&self) -> Option<PathBuf>;

    /// Bring the surface to the front.
    fn show(&mut self);

    /// Copy of the full content.
    fn snapshot(&self) -> String;
}
