//! Presentation surface that echoes to stdout.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use console::Term;
use gobuild_core::PresentationSurface;
use gobuild_runtime::{MemorySurface, SurfaceFactory};
use tracing::warn;

/// Keeps the panel content in memory and mirrors every append to a terminal.
#[derive(Debug)]
pub struct TerminalSurface {
    inner: MemorySurface,
    term: Term,
}

impl TerminalSurface {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_term(name, Term::stdout())
    }

    pub fn with_term(name: impl Into<String>, term: Term) -> Self {
        Self {
            inner: MemorySurface::new(name),
            term,
        }
    }
}

impl PresentationSurface for TerminalSurface {
    fn size(&self) -> usize {
        self.inner.size()
    }

    fn ends_with(&self, suffix: &str) -> bool {
        self.inner.ends_with(suffix)
    }

    fn append(&mut self, text: &str) {
        self.inner.append(text);
        if let Err(e) = self.term.write_str(text).and_then(|()| self.term.flush()) {
            warn!(panel = self.inner.name(), error = %e, "Failed to echo output");
        }
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn set_base_dir(&mut self, dir: &Path) {
        self.inner.set_base_dir(dir);
    }

    fn base_dir(&self) -> Option<PathBuf> {
        self.inner.base_dir()
    }

    fn show(&mut self) {
        self.inner.show();
    }

    fn snapshot(&self) -> String {
        self.inner.snapshot()
    }
}

/// Surfaces for every target echo to the process's stdout.
pub fn terminal_surface_factory(panel_name: impl Into<String>) -> SurfaceFactory {
    let panel_name = panel_name.into();
    Arc::new(move |_| Box::new(TerminalSurface::new(panel_name.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_tracks_appends() {
        let mut surface = TerminalSurface::with_term("golang_build", Term::stderr());
        surface.append("> Output:\n");
        surface.append("ok\n");
        assert!(surface.ends_with("ok\n"));
        assert_eq!(surface.snapshot(), "> Output:\nok\n");

        surface.clear();
        assert_eq!(surface.size(), 0);
    }
}
