//! Output sink ordering and printer admission.
#![cfg(unix)]

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use common::fixtures::{TEST_TARGET, path_env, sh, sink};
use gobuild::{EventBus, PrinterState, ProcessHandle, ProcessPrinter};
use gobuild_runtime::PrinterConfig;

fn config(task: &str) -> PrinterConfig {
    PrinterConfig {
        target: TEST_TARGET,
        task: task.to_string(),
        header_env_vars: Vec::new(),
        topic: "build_complete".to_string(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_printers_do_not_interleave() {
    let (_coordinator, sink) = sink(TEST_TARGET);
    let bus = Arc::new(EventBus::new());

    let alpha = ProcessHandle::start(
        sh("echo alpha-1; sleep 0.2; echo alpha-2"),
        "/",
        path_env(),
    )
    .unwrap();
    let bravo = ProcessHandle::start(
        sh("echo bravo-1; sleep 0.2; echo bravo-2"),
        "/",
        path_env(),
    )
    .unwrap();

    let first = ProcessPrinter::spawn(alpha, sink.clone(), None, config("alpha"), bus.clone());
    let second = ProcessPrinter::spawn(bravo, sink.clone(), None, config("bravo"), bus);
    first.wait().await.unwrap();
    second.wait().await.unwrap();

    let content = sink.contents();
    let blocks: Vec<&str> = content.split("> Directory:").skip(1).collect();
    assert_eq!(blocks.len(), 2, "{content}");
    for block in blocks {
        let alpha = block.contains("alpha-1") && block.contains("alpha-2");
        let bravo = block.contains("bravo-1") && block.contains("bravo-2");
        assert!(alpha != bravo, "interleaved block: {block:?}");
        assert_eq!(block.matches("> Result: Success").count(), 1);
    }
    assert!(!sink.is_printing());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reset_while_printing_keeps_content() {
    let (coordinator, sink) = sink(TEST_TARGET);
    let process = ProcessHandle::start(sh("echo started; exec sleep 30"), "/", path_env()).unwrap();
    let printer = ProcessPrinter::spawn(
        Arc::clone(&process),
        sink.clone(),
        None,
        config("build"),
        Arc::new(EventBus::new()),
    );

    let mut states = printer.watch();
    states
        .wait_for(|state| *state == PrinterState::Streaming)
        .await
        .unwrap();
    common::fixtures::wait_for_output(&sink, "started\n").await;
    let before = sink.content_len();

    let resetting = sink.clone();
    let cleared = coordinator.run(move || resetting.reset()).await.unwrap();
    assert!(!cleared.unwrap());
    assert!(sink.content_len() >= before);

    process.terminate();
    printer.wait().await.unwrap();
    assert!(sink.contents().contains("started\n"));
    assert!(sink.content_len() > before);

    let resetting = sink.clone();
    let cleared = coordinator.run(move || resetting.reset()).await.unwrap();
    assert!(cleared.unwrap());
    assert_eq!(sink.content_len(), 0);
}

#[test]
fn test_reset_off_coordinator_is_rejected() {
    let (_coordinator, sink) = sink(TEST_TARGET);
    assert!(matches!(
        sink.reset(),
        Err(gobuild::ProcessError::WrongContext(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_producers_keep_per_thread_order() {
    const PRODUCERS: usize = 4;
    const WRITES: usize = 100;

    let (_coordinator, sink) = sink(TEST_TARGET);
    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let sink = sink.clone();
            thread::spawn(move || {
                for n in 0..WRITES {
                    sink.append(format!("{producer}:{n};"));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }
    assert!(sink.flush().await);

    let content = sink.contents();
    let mut next = vec![0usize; PRODUCERS];
    for entry in content.split(';').filter(|e| !e.is_empty()) {
        let (producer, n) = entry.split_once(':').unwrap();
        let producer: usize = producer.parse().unwrap();
        let n: usize = n.parse().unwrap();
        assert_eq!(n, next[producer], "out of order write from {producer}");
        next[producer] += 1;
    }
    assert_eq!(next, vec![WRITES; PRODUCERS]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_merged_channel_ends_with_single_eof() {
    let process = ProcessHandle::start(
        sh("echo out; echo err >&2; echo more"),
        "/",
        HashMap::new(),
    )
    .unwrap();
    let mut output = process.take_output().unwrap();

    let mut chunks = Vec::new();
    while let Some(chunk) = output.recv().await {
        chunks.push(chunk);
    }

    let eofs = chunks.iter().filter(|c| c.is_eof()).count();
    assert_eq!(eofs, 1);
    assert!(chunks.last().unwrap().is_eof());

    let stdout: String = chunks
        .iter()
        .filter(|c| c.kind() == Some(gobuild::StreamKind::Stdout))
        .filter_map(|c| c.as_text())
        .collect();
    assert_eq!(stdout, "out\nmore\n");
}
