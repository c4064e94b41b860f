use std::fmt;

use serde::{Deserialize, Serialize};

/// Which of a child's two output streams a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item on a process's merged output channel.
///
/// A channel yields zero or more `Stdout`/`Stderr` chunks followed by exactly
/// one `Eof`. Order is preserved within each stream but not across them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "lowercase")]
pub enum OutputChunk {
    Stdout(String),
    Stderr(String),
    Eof,
}

impl OutputChunk {
    /// Build a text chunk for `kind`.
    pub fn text(kind: StreamKind, text: impl Into<String>) -> Self {
        match kind {
            StreamKind::Stdout => Self::Stdout(text.into()),
            StreamKind::Stderr => Self::Stderr(text.into()),
        }
    }

    /// Text payload, `None` for `Eof`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Stdout(text) | Self::Stderr(text) => Some(text),
            Self::Eof => None,
        }
    }

    /// Source stream, `None` for `Eof`.
    pub const fn kind(&self) -> Option<StreamKind> {
        match self {
            Self::Stdout(_) => Some(StreamKind::Stdout),
            Self::Stderr(_) => Some(StreamKind::Stderr),
            Self::Eof => None,
        }
    }

    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }
}
