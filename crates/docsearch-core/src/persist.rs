use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::DocSearchError;
use crate::model::DocumentInfo;

/// The metadata-only document list on disk (pretty-printed JSON array).
///
/// Reading never fails: a missing file is an empty list and a malformed
/// one is logged and treated as empty. Write failures are logged and
/// dropped so that a read-only disk does not block ingestion.
#[derive(Debug, Clone)]
pub struct MetadataFile {
    path: PathBuf,
}

impl MetadataFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MetadataFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Vec<DocumentInfo> {
        match self.try_load() {
            Ok(infos) => infos,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable document list");
                Vec::new()
            }
        }
    }

    pub fn try_load(&self) -> Result<Vec<DocumentInfo>, DocSearchError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, infos: &[DocumentInfo]) {
        if let Err(e) = self.try_save(infos) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not save document list");
        }
    }

    /// Write through a temp file in the same directory, then rename.
    pub fn try_save(&self, infos: &[DocumentInfo]) -> Result<(), DocSearchError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(infos)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path)
            .map_err(|e| DocSearchError::Persistence(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn info(path: &str) -> DocumentInfo {
        DocumentInfo {
            path: path.into(),
            name: "liste.pdf".into(),
            extension: ".pdf".into(),
            size: 1024,
            timestamp: Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = MetadataFile::new(dir.path().join("nested/documents.json"));
        let infos = vec![info("/a/liste.pdf"), info("/b/liste.pdf")];
        file.try_save(&infos).unwrap();
        assert_eq!(file.load(), infos);
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = MetadataFile::new(dir.path().join("documents.json"));
        assert!(file.try_load().unwrap().is_empty());
    }

    #[test]
    fn malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.json");
        std::fs::write(&path, "{ not json").unwrap();
        let file = MetadataFile::new(&path);
        assert!(file.try_load().is_err());
        assert!(file.load().is_empty());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.json");
        std::fs::write(&path, r#"[{"path": "/a/x.pdf", "timestamp": "2024-03-01T09:30:00+03:00"}]"#)
            .unwrap();
        let infos = MetadataFile::new(&path).load();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].path, "/a/x.pdf");
        assert_eq!(infos[0].size, 0);
        assert_eq!(infos[0].name, "");
    }

    #[test]
    fn entry_without_timestamp_does_not_discard_the_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.json");
        std::fs::write(
            &path,
            r#"[{"path": "/a/x.pdf", "timestamp": "2024-03-01T09:30:00+03:00"}, {"path": "/b/y.xlsx"}]"#,
        )
        .unwrap();
        let before = Local::now();
        let infos = MetadataFile::new(&path).try_load().unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[1].path, "/b/y.xlsx");
        assert!(infos[1].timestamp >= before);
    }

    #[test]
    fn save_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be.
        let file = MetadataFile::new(dir.path());
        file.save(&[info("/a/liste.pdf")]);
        assert!(dir.path().is_dir());
    }
}
