use crate::domain::ports::Storage;
use crate::utils::error::ExportError;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Relative paths resolve against the base directory, absolute ones are kept.
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

fn write_error(path: &Path, source: std::io::Error) -> ExportError {
    ExportError::Write {
        path: path.to_path_buf(),
        source,
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<(), ExportError> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| write_error(&full_path, e))?;
        }

        tokio::fs::write(&full_path, data)
            .await
            .map_err(|e| write_error(&full_path, e))?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parents_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.write_file("out/data.bin", b"first").await.unwrap();
        storage.write_file("out/data.bin", b"2nd").await.unwrap();

        let written = std::fs::read(dir.path().join("out/data.bin")).unwrap();
        assert_eq!(written, b"2nd");
    }

    #[tokio::test]
    async fn test_unwritable_path_reports_full_path() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("blocker"), b"file, not a dir").unwrap();
        let storage = LocalStorage::new(dir.path());

        let err = storage
            .write_file("blocker/watch_data.xlsx", b"data")
            .await
            .unwrap_err();
        match err {
            ExportError::Write { path, .. } => {
                assert_eq!(path, dir.path().join("blocker/watch_data.xlsx"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
