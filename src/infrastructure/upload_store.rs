// Scoped temporary storage for uploaded CSV files
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// An uploaded file on disk. Removed when closed or dropped.
#[derive(Debug)]
pub struct ScopedUpload {
    file: NamedTempFile,
}

impl ScopedUpload {
    pub fn persist(contents: &[u8]) -> std::io::Result<Self> {
        Self::persist_in(&std::env::temp_dir(), contents)
    }

    pub fn persist_in(dir: &Path, contents: &[u8]) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("forecast-upload-")
            .suffix(".csv")
            .tempfile_in(dir)?;
        file.write_all(contents)?;
        file.flush()?;

        tracing::info!(path = %file.path().display(), bytes = contents.len(), "saved upload");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file now, reporting failures instead of ignoring them in `Drop`.
    pub fn close(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove upload");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_removes_file() {
        let upload = ScopedUpload::persist(b"product_id,ds,y\n").unwrap();
        let path = upload.path().to_path_buf();
        assert_eq!(std::fs::read(&path).unwrap(), b"product_id,ds,y\n");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("csv"));

        upload.close();
        assert!(!path.exists());
    }

    #[test]
    fn test_persist_in_uses_directory() {
        let dir = tempfile::tempdir().unwrap();
        let upload = ScopedUpload::persist_in(dir.path(), b"data").unwrap();
        assert_eq!(upload.path().parent(), Some(dir.path()));

        upload.close();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_drop_removes_file() {
        let path = {
            let upload = ScopedUpload::persist(b"data").unwrap();
            upload.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
