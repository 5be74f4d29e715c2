//! Shell quoting checked against a real `sh`.
//!
//! Every hostile value is rendered through `quote` (and through the typed
//! command line), run with `printf %s`, and must come back byte-for-byte with
//! no side effects.

#![cfg(unix)]

mod helpers;

use dbdump_pipeline::pipeline::{PipelineExecutor, PipelineSpec};
use dbdump_pipeline::shell::{quote, CommandLine, Value};

use helpers::scratch;

fn hostile_values(marker: &str) -> Vec<String> {
    vec![
        "plain".to_string(),
        "two words".to_string(),
        "O'Brien".to_string(),
        "'".to_string(),
        "''".to_string(),
        "'; echo injected; '".to_string(),
        format!("$(touch {marker})"),
        format!("`touch {marker}`"),
        "${HOME}".to_string(),
        "\"double\"".to_string(),
        "back\\slash".to_string(),
        "semi;colon && pipe | amp &".to_string(),
        "glob * ? [a-z]".to_string(),
        "line\nbreak".to_string(),
        "tab\there".to_string(),
        "-n".to_string(),
        "ünïcödé 表".to_string(),
    ]
}

#[tokio::test]
async fn test_quoted_values_round_trip() {
    let dir = scratch();
    let marker = dir.path().join("pwned").display().to_string();
    let executor = PipelineExecutor::default();

    for (i, value) in hostile_values(&marker).into_iter().enumerate() {
        let dest = dir.path().join(format!("out-{i}"));
        let spec = PipelineSpec::new(format!("printf %s {}", quote(&value)));
        executor
            .run(&spec, &dest)
            .await
            .unwrap_or_else(|e| panic!("value {value:?} failed: {e}"));
        assert_eq!(
            std::fs::read(&dest).unwrap(),
            value.as_bytes(),
            "value {value:?} did not survive the shell"
        );
    }
    assert!(!std::path::Path::new(&marker).exists());
}

#[tokio::test]
async fn test_command_line_values_round_trip() {
    let dir = scratch();
    let marker = dir.path().join("pwned").display().to_string();
    let executor = PipelineExecutor::default();

    for (i, value) in hostile_values(&marker).into_iter().enumerate() {
        let dest = dir.path().join(format!("cmd-{i}"));
        let mut printf = CommandLine::new("printf");
        printf
            .positional(Value::text("%s"))
            .positional(Value::text(value.clone()));
        let mut cat = CommandLine::new("cat");
        cat.flag("-");
        let spec = PipelineSpec::pipe(&printf, &cat);
        executor.run(&spec, &dest).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), value.as_bytes());
    }
    assert!(!std::path::Path::new(&marker).exists());
}

#[tokio::test]
async fn test_empty_value_stays_one_argument() {
    let dir = scratch();
    let dest = dir.path().join("argc");
    // '' must still count as an argument
    let spec = PipelineSpec::new(format!("set -- {} x; printf %s \"$#\"", quote("")));
    PipelineExecutor::default().run(&spec, &dest).await.unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"2");
}
