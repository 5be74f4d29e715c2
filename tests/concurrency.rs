//! Concurrent pipelines sharing one executor and one scratch directory.

#![cfg(unix)]

mod helpers;

use std::collections::HashSet;
use std::time::Duration;

use futures::future::join_all;

use dbdump_pipeline::archive::ScratchDir;
use dbdump_pipeline::pipeline::{PipelineExecutor, PipelineSpec};
use dbdump_pipeline::FailureKind;

use helpers::{entries, scratch};

#[tokio::test]
async fn test_concurrent_runs_do_not_interfere() {
    let dir = scratch();
    let scratch_dir = ScratchDir::new(dir.path());
    let executor = PipelineExecutor::default();

    let jobs: Vec<_> = (0..12)
        .map(|i| {
            let path = scratch_dir.new_path("job", "sql.gz");
            let spec = PipelineSpec::new(format!("sleep 0.1; printf 'job-{i}'"));
            (i, path, spec)
        })
        .collect();

    let results = join_all(
        jobs.iter()
            .map(|(_, path, spec)| executor.run(spec, path)),
    )
    .await;

    let mut seen = HashSet::new();
    for ((i, path, _), result) in jobs.iter().zip(results) {
        let output = result.expect("job should succeed");
        assert_eq!(&output.path, path);
        assert!(seen.insert(output.path.clone()), "duplicate path");
        assert_eq!(
            std::fs::read(path).unwrap(),
            format!("job-{i}").into_bytes()
        );
    }
    assert_eq!(entries(dir.path()), 12);
}

#[tokio::test]
async fn test_timeout_of_one_run_leaves_others_alone() {
    let dir = scratch();
    let scratch_dir = ScratchDir::new(dir.path());
    let executor = PipelineExecutor::default();

    let slow = PipelineSpec::new("printf slow; sleep 30")
        .with_timeout(Some(Duration::from_millis(300)));
    let fast = PipelineSpec::new("sleep 0.5; printf fast")
        .with_timeout(Some(Duration::from_secs(20)));
    let slow_path = scratch_dir.new_path("slow", "sql");
    let fast_path = scratch_dir.new_path("fast", "sql");

    let (slow_result, fast_result) = tokio::join!(
        executor.run(&slow, &slow_path),
        executor.run(&fast, &fast_path)
    );

    assert_eq!(slow_result.unwrap_err().kind(), FailureKind::Timeout);
    assert!(!slow_path.exists());
    assert_eq!(fast_result.unwrap().bytes, 4);
    assert_eq!(std::fs::read(&fast_path).unwrap(), b"fast");
}
