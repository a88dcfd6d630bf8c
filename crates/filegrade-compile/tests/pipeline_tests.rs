#![cfg(unix)]

use std::fs;
use std::sync::Arc;

use filegrade_compile::{CompilePipeline, ExitKind, FileScoreLog};
use filegrade_core::InspectConfig;
use tempfile::TempDir;

fn scripted_config(script: &str, log: &std::path::Path) -> InspectConfig {
    InspectConfig::builder()
        .compiler("sh")
        .compiler_args(vec!["-c".to_string(), script.to_string(), "sh".to_string()])
        .score_log(log)
        .compile_timeout_secs(20u64)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_score_log_is_append_only_across_runs() {
    let temp = TempDir::new().unwrap();
    let log_path = temp.path().join("grades.txt");
    fs::write(&log_path, "legacy: 4\n").unwrap();

    let clean = scripted_config("true", &log_path);
    let sink = Arc::new(FileScoreLog::new(&clean.score_log));
    CompilePipeline::from_config(&clean, sink.clone())
        .run(&temp.path().join("first.c"))
        .await
        .unwrap();

    let after_first = fs::read_to_string(&log_path).unwrap();
    assert_eq!(after_first, "legacy: 4\nfirst.c: 10\n");

    let noisy = scripted_config("echo 'second.c:3:1: warning: unused' >&2", &log_path);
    CompilePipeline::from_config(&noisy, sink)
        .run(&temp.path().join("second.c"))
        .await
        .unwrap();

    let after_second = fs::read_to_string(&log_path).unwrap();
    assert!(after_second.starts_with(&after_first));
    assert_eq!(after_second, "legacy: 4\nfirst.c: 10\nsecond.c: 9\n");
}

#[tokio::test]
async fn test_concurrent_pipelines_share_log() {
    let temp = TempDir::new().unwrap();
    let log_path = temp.path().join("grades.txt");
    let config = scripted_config("echo 'w.c:1:1: warning: x' >&2", &log_path);
    let sink = Arc::new(FileScoreLog::new(&log_path));

    let mut handles = Vec::new();
    for i in 0..8 {
        let pipeline = CompilePipeline::from_config(&config, sink.clone());
        let source = temp.path().join(format!("file{i}.c"));
        handles.push(tokio::spawn(async move { pipeline.run(&source).await }));
    }
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome.compiler, ExitKind::Code(0));
    }

    let contents = fs::read_to_string(&log_path).unwrap();
    let mut lines: Vec<&str> = contents.lines().collect();
    lines.sort();
    let expected: Vec<String> = (0..8).map(|i| format!("file{i}.c: 9")).collect();
    assert_eq!(lines, expected);
}
