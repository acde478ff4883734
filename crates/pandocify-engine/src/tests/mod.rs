use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary manuscript directory
pub fn create_test_manuscript_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a test file, and any missing parent directories, with content
pub fn create_test_file(manuscript_dir: &TempDir, relative_path: &str, content: &str) -> PathBuf {
    let file_path = manuscript_dir.path().join(relative_path);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&file_path, content).unwrap();
    file_path
}
