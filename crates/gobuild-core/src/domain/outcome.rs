use std::fmt;

use serde::{Deserialize, Serialize};

/// Terminal result of a supervised process.
///
/// "Unset" is modelled as `Option<ProcessOutcome>::None` by holders; once a
/// value is recorded it never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessOutcome {
    /// Terminated on request. Wins over whatever exit status the child reports.
    Cancelled,
    /// Exited with status zero.
    Success,
    /// Exited with a non-zero status or was killed by something else.
    Error,
}

impl ProcessOutcome {
    /// Map a reaped exit status to an outcome.
    pub const fn from_exit_success(success: bool) -> Self {
        if success { Self::Success } else { Self::Error }
    }

    /// Lowercase wire name (`"success"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Human-readable label used in output footers (`"Success"`).
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cancelled => "Cancelled",
            Self::Success => "Success",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
