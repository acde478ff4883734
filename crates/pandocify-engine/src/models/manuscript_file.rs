use relative_path::{RelativePath, RelativePathBuf};

/// A chapter file listed in the manuscript manifest
#[derive(Debug, Clone, PartialEq)]
pub struct ManuscriptFile {
    relative_path: RelativePathBuf,
    position: usize,
}

impl ManuscriptFile {
    /// Create a new ManuscriptFile at `position` in book order
    pub fn new(relative_path: RelativePathBuf, position: usize) -> Self {
        Self {
            relative_path,
            position,
        }
    }

    /// Get the relative path inside the manuscript directory
    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    /// Zero-based position in the manifest
    pub fn position(&self) -> usize {
        self.position
    }

    /// File name prefixed with its zero-padded position, e.g. `03-charts.md`,
    /// so that chapter files sort in book order
    pub fn indexed_file_name(&self) -> String {
        let name = self.relative_path.file_name().unwrap_or("untitled.md");
        format!("{:02}-{name}", self.position)
    }
}

/// Parse a manifest: one file name per line, in book order. Blank lines are
/// skipped.
pub fn parse_manifest(manifest: &str) -> Vec<ManuscriptFile> {
    manifest
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(position, line)| ManuscriptFile::new(RelativePathBuf::from(line), position))
        .collect()
}
