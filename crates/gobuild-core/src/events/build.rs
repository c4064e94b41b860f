use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ProcessOutcome, TargetId};

/// Snapshot published exactly once per supervised process, after its footer
/// has been applied to the output sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildCompleteEvent {
    /// Target the process ran for.
    pub target: TargetId,
    /// Task label, e.g. `"build"` or `"cross_compile"`.
    pub task: String,
    /// Full argument vector, program first.
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Environment the process was started with.
    pub env: HashMap<String, String>,
    /// Wall-clock start time.
    pub started_at: DateTime<Utc>,
    /// Finish minus start.
    pub runtime: Duration,
    pub result: ProcessOutcome,
}

impl BuildCompleteEvent {
    /// Runtime in fractional seconds.
    pub fn runtime_secs(&self) -> f64 {
        self.runtime.as_secs_f64()
    }

    pub fn succeeded(&self) -> bool {
        self.result == ProcessOutcome::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BuildCompleteEvent {
        BuildCompleteEvent {
            target: TargetId(3),
            task: "build".to_string(),
            args: vec!["go".to_string(), "build".to_string()],
            working_dir: PathBuf::from("/src/hello"),
            env: HashMap::from([("GOPATH".to_string(), "/go".to_string())]),
            started_at: Utc::now(),
            runtime: Duration::from_millis(1500),
            result: ProcessOutcome::Success,
        }
    }

    #[test]
    fn test_runtime_secs() {
        let event = sample();
        assert!((event.runtime_secs() - 1.5).abs() < f64::EPSILON);
        assert!(event.succeeded());
    }

    #[test]
    fn test_event_serializes_result_lowercase() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["result"], "success");
        assert_eq!(json["task"], "build");
        assert_eq!(json["target"], 3);
    }
}
