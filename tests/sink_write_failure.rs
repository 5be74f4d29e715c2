//! A write error in the middle of the stream.
//!
//! Lowers this process's file size limit so the archive write fails with
//! EFBIG once the first buffer is flushed. Kept in its own test binary since
//! the limit applies to the whole process.

#![cfg(target_os = "linux")]

mod helpers;

use std::time::{Duration, Instant};

use dbdump_pipeline::pipeline::{PipelineExecutor, PipelineSpec};
use dbdump_pipeline::FailureKind;

use helpers::{entries, scratch};

const FILE_SIZE_LIMIT: libc::rlim_t = 2 * 1024 * 1024;

fn limit_file_size(soft: libc::rlim_t) -> libc::rlimit {
    let mut previous = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: plain syscalls on an owned struct; SIGXFSZ is ignored so the
    // oversized write returns EFBIG instead of killing the test process.
    unsafe {
        assert_eq!(libc::getrlimit(libc::RLIMIT_FSIZE, &mut previous), 0);
        libc::signal(libc::SIGXFSZ, libc::SIG_IGN);
        let limited = libc::rlimit {
            rlim_cur: soft.min(previous.rlim_max),
            rlim_max: previous.rlim_max,
        };
        assert_eq!(libc::setrlimit(libc::RLIMIT_FSIZE, &limited), 0);
    }
    previous
}

#[tokio::test]
async fn test_write_error_mid_stream_kills_and_removes_file() {
    let dir = scratch();
    let dest = dir.path().join("full.sql");
    let spec = PipelineSpec::new("awk 'BEGIN { for (;;) printf \"abcdefg\\n\" }'");

    let previous = limit_file_size(FILE_SIZE_LIMIT);
    let started = Instant::now();
    let result = PipelineExecutor::default().run(&spec, &dest).await;
    // SAFETY: restores the limit read above.
    unsafe {
        libc::setrlimit(libc::RLIMIT_FSIZE, &previous);
    }

    let err = result.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Sink);
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!dest.exists());
    assert_eq!(entries(dir.path()), 0);
}
