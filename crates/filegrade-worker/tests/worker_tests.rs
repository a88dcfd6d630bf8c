#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use filegrade_compile::{CompilePipeline, MemoryScoreLog};
use filegrade_core::{EntityKind, InspectConfig, Options, TargetSpec};
use filegrade_worker::{
    MemoryReportSink, Orchestrator, PresetOptions, ReportFormat, WorkerContext, WorkerExit,
    prepare,
};
use tempfile::TempDir;

fn context(script: &str) -> (WorkerContext, Arc<MemoryReportSink>, Arc<MemoryScoreLog>) {
    let config = Arc::new(InspectConfig::default());
    let scores = Arc::new(MemoryScoreLog::new());
    let pipeline = Arc::new(
        CompilePipeline::new(
            "sh",
            vec!["-c".to_string(), script.to_string(), "sh".to_string()],
            "grep",
            vec!["-E".to_string(), "error|warning".to_string()],
            scores.clone(),
        )
        .with_timeout(Some(Duration::from_secs(20))),
    );
    let reports = Arc::new(MemoryReportSink::new());
    let ctx = WorkerContext::new(config, pipeline, reports.clone());
    (ctx, reports, scores)
}

fn spec(path: &Path, kind: EntityKind, opts: &str, link: Option<&str>) -> TargetSpec {
    TargetSpec::new(
        path,
        kind,
        Options::parse(opts, kind).unwrap(),
        link.map(String::from),
    )
    .unwrap()
}

fn report_blocks(reports: &MemoryReportSink) -> Vec<String> {
    reports
        .blocks()
        .into_iter()
        .filter(|b| !b.starts_with("Worker "))
        .collect()
}

#[tokio::test]
async fn test_no_action_before_barrier_release() {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("first");
    let second = temp.path().join("second");
    fs::create_dir(&first).unwrap();
    fs::create_dir(&second).unwrap();

    let (ctx, reports, _) = context("true");
    let mut orchestrator = Orchestrator::new(ctx);

    orchestrator
        .spawn(spec(&first, EntityKind::Directory, "-n", None))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(!first.join("first_file.txt").exists());
    assert!(reports.blocks().is_empty());

    orchestrator
        .spawn(spec(&second, EntityKind::Directory, "-n", None))
        .unwrap();
    assert_eq!(orchestrator.pending(), 2);
    orchestrator.release_barrier();

    let terminations = orchestrator.collect().await;
    assert_eq!(terminations.len(), 2);
    assert!(terminations.iter().all(|t| t.exit == WorkerExit::Success));
    assert!(first.join("first_file.txt").exists());
    assert!(second.join("second_file.txt").exists());
    assert_eq!(report_blocks(&reports).len(), 2);
}

#[tokio::test]
async fn test_one_report_per_target_with_requested_fields() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("proj");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("a.c"), vec![b'x'; 100]).unwrap();
    let notes = temp.path().join("notes.txt");
    fs::write(&notes, "one\ntwo\n").unwrap();

    let (ctx, reports, _) = context("true");
    let summary = Orchestrator::new(ctx)
        .run(vec![
            spec(&dir, EntityKind::Directory, "-dc", None),
            spec(&notes, EntityKind::File, "-n", None),
        ])
        .await;

    assert!(summary.all_succeeded());
    let blocks = report_blocks(&reports);
    assert_eq!(blocks.len(), 2);

    let dir_block = blocks.iter().find(|b| b.contains("proj")).unwrap();
    assert!(dir_block.contains("total size: 100 bytes"));
    assert!(!dir_block.contains("Permissions"));
    assert!(!dir_block.contains("Last modified"));

    let file_block = blocks.iter().find(|b| b.contains("notes.txt")).unwrap();
    assert!(file_block.contains("name: notes.txt"));
    assert!(!file_block.contains("size:"));
    assert!(!file_block.contains("Permissions"));
}

#[tokio::test]
async fn test_source_file_is_compiled_and_scored() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("main.c");
    fs::write(&source, "int main(void) { return 0; }\n").unwrap();

    let (ctx, reports, scores) = context("echo 'main.c:1:1: warning: unused' >&2");
    let summary = Orchestrator::new(ctx)
        .run(vec![spec(&source, EntityKind::File, "-n", None)])
        .await;

    assert!(summary.all_succeeded());
    assert_eq!(scores.lines(), vec!["main.c: 9".to_string()]);
    let blocks = report_blocks(&reports);
    assert!(blocks[0].contains("1 warning(s)"));
}

#[tokio::test]
async fn test_link_flag_wins_over_compile() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("main.c");
    fs::write(&source, "int main(void) { return 0; }\n").unwrap();
    let link = temp.path().join("alias.c");

    let (ctx, _, scores) = context("true");
    let summary = Orchestrator::new(ctx)
        .run(vec![spec(
            &source,
            EntityKind::File,
            "-l",
            Some(link.to_str().unwrap()),
        )])
        .await;

    assert!(summary.all_succeeded());
    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert!(scores.lines().is_empty());
}

#[tokio::test]
async fn test_symlink_delete_and_chmod() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("target.txt");
    fs::write(&target, "x").unwrap();
    let doomed = temp.path().join("doomed");
    let kept = temp.path().join("kept");
    std::os::unix::fs::symlink(&target, &doomed).unwrap();
    std::os::unix::fs::symlink(&target, &kept).unwrap();

    let (ctx, _, _) = context("true");
    let summary = Orchestrator::new(ctx)
        .run(vec![
            spec(&doomed, EntityKind::Symlink, "-l", None),
            spec(&kept, EntityKind::Symlink, "-n", None),
        ])
        .await;

    assert!(summary.all_succeeded());
    assert!(fs::symlink_metadata(&doomed).is_err());
    assert!(fs::symlink_metadata(&kept).is_ok());

    use std::os::unix::fs::PermissionsExt;
    let mode = fs::metadata(&target).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o760);
}

#[tokio::test]
async fn test_vanished_target_fails_worker() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("gone.txt");
    fs::write(&file, "x").unwrap();
    let target = spec(&file, EntityKind::File, "-n", None);
    fs::remove_file(&file).unwrap();

    let (ctx, reports, _) = context("true");
    let summary = Orchestrator::new(ctx).run(vec![target]).await;

    assert!(!summary.all_succeeded());
    assert!(matches!(
        summary.terminations[0].exit,
        WorkerExit::Failed { .. }
    ));
    assert_eq!(report_blocks(&reports).len(), 1);
}

#[tokio::test]
async fn test_json_status_lines() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("f.txt");
    fs::write(&file, "x").unwrap();

    let (ctx, reports, _) = context("true");
    let ctx = ctx.with_format(ReportFormat::Json);
    let argv = vec![file.to_str().unwrap().to_string(), "-n".to_string()];
    let prepared = prepare(&argv, &mut PresetOptions);
    Orchestrator::new(ctx).run(prepared.specs).await;

    let blocks = reports.blocks();
    assert_eq!(blocks.len(), 2);
    for block in &blocks {
        let value: serde_json::Value = serde_json::from_str(block.trim_end()).unwrap();
        assert!(value.is_object());
    }
    assert!(blocks[1].contains("\"exit\":\"Success\""));
}
