//! Per-target bookkeeping of running processes and output sinks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use gobuild_core::TargetId;

use crate::process::ProcessHandle;
use crate::sink::OutputSink;
use crate::sync::lock;

/// Maps each target to its most recent process and its output sink.
///
/// Callable from any thread. Sinks live as long as the registry; process
/// entries are replaced on each start and are not cleared on exit.
#[derive(Debug, Default)]
pub struct Registry {
    processes: Mutex<HashMap<TargetId, Arc<ProcessHandle>>>,
    sinks: Mutex<HashMap<TargetId, OutputSink>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently registered process for `target`, finished or not.
    pub fn get_process(&self, target: TargetId) -> Option<Arc<ProcessHandle>> {
        lock(&self.processes).get(&target).cloned()
    }

    /// Replace (or with `None`, remove) the process for `target`.
    ///
    /// Returns the previous entry.
    pub fn set_process(
        &self,
        target: TargetId,
        process: Option<Arc<ProcessHandle>>,
    ) -> Option<Arc<ProcessHandle>> {
        let mut processes = lock(&self.processes);
        match process {
            Some(process) => processes.insert(target, process),
            None => processes.remove(&target),
        }
    }

    /// The sink for `target`, created with `create` if there is none yet.
    ///
    /// Concurrent callers for the same target all get the same sink.
    pub fn get_sink<F>(&self, target: TargetId, create: F) -> OutputSink
    where
        F: FnOnce() -> OutputSink,
    {
        lock(&self.sinks).entry(target).or_insert_with(create).clone()
    }

    /// The sink for `target` if one was ever created.
    pub fn existing_sink(&self, target: TargetId) -> Option<OutputSink> {
        lock(&self.sinks).get(&target).cloned()
    }

    /// Every registered process that has not finished yet.
    pub fn active_processes(&self) -> Vec<(TargetId, Arc<ProcessHandle>)> {
        lock(&self.processes)
            .iter()
            .filter(|(_, process)| !process.is_finished())
            .map(|(target, process)| (*target, Arc::clone(process)))
            .collect()
    }

    pub fn targets(&self) -> Vec<TargetId> {
        let mut targets: Vec<TargetId> = lock(&self.sinks).keys().copied().collect();
        targets.sort_unstable();
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::Coordinator;
    use crate::sink::MemorySurface;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_get_sink_creates_once() {
        let registry = Registry::new();
        let coordinator = Arc::new(Coordinator::start().unwrap());
        let created = AtomicUsize::new(0);

        let make = || {
            created.fetch_add(1, Ordering::SeqCst);
            OutputSink::new(
                TargetId(3),
                Box::new(MemorySurface::default()),
                Arc::clone(&coordinator),
            )
        };
        let first = registry.get_sink(TargetId(3), make);
        let second = registry.get_sink(TargetId(3), || unreachable!("sink already exists"));

        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert_eq!(first.target(), second.target());
        assert!(registry.existing_sink(TargetId(4)).is_none());
        assert_eq!(registry.targets(), vec![TargetId(3)]);
    }

    #[test]
    fn test_get_sink_concurrent_callers_share_one() {
        let registry = Arc::new(Registry::new());
        let coordinator = Arc::new(Coordinator::start().unwrap());
        let created = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let coordinator = Arc::clone(&coordinator);
                let created = Arc::clone(&created);
                thread::spawn(move || {
                    registry.get_sink(TargetId(1), || {
                        created.fetch_add(1, Ordering::SeqCst);
                        OutputSink::new(TargetId(1), Box::new(MemorySurface::default()), coordinator)
                    });
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_target_has_no_process() {
        let registry = Registry::new();
        assert!(registry.get_process(TargetId(42)).is_none());
        assert!(registry.set_process(TargetId(42), None).is_none());
        assert!(registry.active_processes().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_set_process_returns_previous() {
        let registry = Registry::new();
        let spawn = || {
            ProcessHandle::start(vec!["/bin/true".to_string()], "/", HashMap::new()).unwrap()
        };

        let first = spawn();
        assert!(registry.set_process(TargetId(1), Some(Arc::clone(&first))).is_none());

        let second = spawn();
        let previous = registry
            .set_process(TargetId(1), Some(Arc::clone(&second)))
            .unwrap();
        assert!(Arc::ptr_eq(&previous, &first));
        assert!(Arc::ptr_eq(&registry.get_process(TargetId(1)).unwrap(), &second));

        second.wait().await;
        first.wait().await;
        assert!(registry.active_processes().is_empty());
        assert!(registry.get_process(TargetId(1)).is_some());
    }
}
