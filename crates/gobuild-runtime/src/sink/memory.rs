//! In-memory presentation surface and result navigation.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use gobuild_core::PresentationSurface;
use regex::Regex;

/// Pattern matching compiler/test result lines: `path.go:line[:col]: message`.
pub const RESULT_LINE_PATTERN: &str = r"^\s*(.+\.go):([0-9]+):(?:([0-9]+):)?\s*(.*)";

#[allow(clippy::expect_used)]
static RESULT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(RESULT_LINE_PATTERN).expect("constant regex pattern is valid"));

/// A navigable location parsed from an output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLocation {
    /// File path, joined onto the base directory when relative.
    pub file: PathBuf,
    pub line: u32,
    pub column: Option<u32>,
    pub message: String,
}

/// Parse a result line, resolving relative paths against `base_dir`.
pub fn parse_result_line(line: &str, base_dir: Option<&Path>) -> Option<ResultLocation> {
    let caps = RESULT_LINE.captures(line)?;

    let raw_file = Path::new(caps.get(1)?.as_str());
    let file = match base_dir {
        Some(base) if raw_file.is_relative() => base.join(raw_file),
        _ => raw_file.to_path_buf(),
    };

    Some(ResultLocation {
        file,
        line: caps.get(2)?.as_str().parse().ok()?,
        column: caps.get(3).and_then(|m| m.as_str().parse().ok()),
        message: caps.get(4).map_or_else(String::new, |m| m.as_str().to_string()),
    })
}

/// A presentation surface that keeps its content in memory.
///
/// Backs tests and any adapter that renders elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    name: String,
    content: String,
    chars: usize,
    base_dir: Option<PathBuf>,
    shown: usize,
}

impl MemorySurface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// How many times the surface was brought to the front.
    pub const fn shown_count(&self) -> usize {
        self.shown
    }

    /// Every navigable result line in the content.
    pub fn results(&self) -> Vec<ResultLocation> {
        self.content
            .lines()
            .filter_map(|line| parse_result_line(line, self.base_dir.as_deref()))
            .collect()
    }
}

impl PresentationSurface for MemorySurface {
    fn size(&self) -> usize {
        self.chars
    }

    fn ends_with(&self, suffix: &str) -> bool {
        self.content.ends_with(suffix)
    }

    fn append(&mut self, text: &str) {
        self.content.push_str(text);
        self.chars += text.chars().count();
    }

    fn clear(&mut self) {
        self.content.clear();
        self.chars = 0;
    }

    fn set_base_dir(&mut self, dir: &Path) {
        self.base_dir = Some(dir.to_path_buf());
    }

    fn base_dir(&self) -> Option<PathBuf> {
        self.base_dir.clone()
    }

    fn show(&mut self) {
        self.shown += 1;
    }

    fn snapshot(&self) -> String {
        self.content.clone()
    }
}
