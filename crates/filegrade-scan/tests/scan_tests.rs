use filegrade_scan::{EntityKind, basename, c_file_count, directory_size, resolve_kind};
use std::fs;
use tempfile::TempDir;

fn create_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::create_dir(root.join("src")).unwrap();
    fs::create_dir(root.join("src/lib")).unwrap();
    fs::write(root.join("src/main.c"), vec![b'a'; 100]).unwrap();
    fs::write(root.join("src/notes.txt"), vec![b'b'; 20]).unwrap();
    fs::write(root.join("src/lib/util.c"), vec![b'c'; 30]).unwrap();

    temp
}

#[test]
fn test_project_directory() {
    let temp = create_project();
    let src = temp.path().join("src");

    assert_eq!(resolve_kind(&src).unwrap(), EntityKind::Directory);
    assert_eq!(basename(&src), "src");
    assert_eq!(directory_size(&src).unwrap(), 150);
    assert_eq!(c_file_count(&src).unwrap(), 1);
}

#[test]
fn test_directory_size_counts_hidden_files() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".hidden"), vec![0u8; 7]).unwrap();
    assert_eq!(directory_size(temp.path()).unwrap(), 7);
}
