//! Process and supervisor fixtures.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use gobuild::{BuildSupervisor, Coordinator, MemorySurface, OutputSink, Settings, TargetId};

/// Target used by tests that only need one.
pub const TEST_TARGET: TargetId = TargetId(1);

/// `/bin/sh -c <script>`.
pub fn sh(script: &str) -> Vec<String> {
    vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()]
}

/// An environment holding only the test runner's `PATH`.
pub fn path_env() -> HashMap<String, String> {
    std::env::var("PATH")
        .map(|path| HashMap::from([("PATH".to_string(), path)]))
        .unwrap_or_default()
}

/// A supervisor with default settings and in-memory surfaces.
pub fn supervisor() -> BuildSupervisor {
    BuildSupervisor::new(
        Settings::with_defaults(),
        gobuild::memory_surface_factory("golang_build"),
    )
    .unwrap()
}

/// A standalone sink on its own coordinator.
pub fn sink(target: TargetId) -> (Arc<Coordinator>, OutputSink) {
    let coordinator = Arc::new(Coordinator::start().unwrap());
    let sink = OutputSink::new(
        target,
        Box::new(MemorySurface::new("golang_build")),
        Arc::clone(&coordinator),
    );
    (coordinator, sink)
}

/// Poll `sink` until its content contains `needle`.
pub async fn wait_for_output(sink: &OutputSink, needle: &str) -> String {
    for _ in 0..100 {
        let content = sink.contents();
        if content.contains(needle) {
            return content;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("output never contained {needle:?}: {:?}", sink.contents());
}
