use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Local;
use tokio::task::JoinSet;

use crate::config::Config;
use crate::error::DocSearchError;
use crate::extraction::{Extracted, FormatRegistry};
use crate::model::{same_path, Document, DocumentInfo, SearchResult};
use crate::persist::MetadataFile;
use crate::search;

/// Outcome of [`DocumentStore::reload_persisted`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadSummary {
    pub loaded: usize,
    /// Entries whose path is blank or no longer exists.
    pub skipped: usize,
    pub failed: usize,
}

/// The in-memory document list plus its metadata file.
///
/// Share it as `Arc<DocumentStore>`; all methods take `&self`.
pub struct DocumentStore {
    documents: RwLock<Vec<Document>>,
    /// Persisted entries whose file exists but could not be re-extracted.
    /// They stay in the metadata file until ingested again or removed.
    unreadable: RwLock<Vec<DocumentInfo>>,
    registry: FormatRegistry,
    metadata: MetadataFile,
}

impl DocumentStore {
    pub fn new(registry: FormatRegistry, metadata: MetadataFile) -> Self {
        DocumentStore {
            documents: RwLock::new(Vec::new()),
            unreadable: RwLock::new(Vec::new()),
            registry,
            metadata,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            FormatRegistry::new(config),
            MetadataFile::new(&config.storage.metadata_path),
        )
    }

    pub fn metadata_file(&self) -> &MetadataFile {
        &self.metadata
    }

    /// Extract `path` and add it, replacing any entry with the same path.
    ///
    /// Unsupported extensions give a document with no text. Blocks for the
    /// whole extraction; see [`DocumentStore::ingest_async`].
    pub fn ingest(&self, path: impl AsRef<Path>) -> Result<Document, DocSearchError> {
        let document = self.build_document(path.as_ref())?;
        let mut documents = self.write();
        replace(&mut documents, document.clone());
        self.unreadable_mut().retain(|info| !same_path(&info.path, &document.path));
        self.persist(&documents);
        Ok(document)
    }

    /// [`DocumentStore::ingest`] on tokio's blocking pool.
    pub async fn ingest_async(
        self: &Arc<Self>,
        path: impl Into<PathBuf>,
    ) -> Result<Document, DocSearchError> {
        let store = Arc::clone(self);
        let path = path.into();
        tokio::task::spawn_blocking(move || store.ingest(&path))
            .await
            .map_err(|e| DocSearchError::Extraction(format!("ingestion task failed: {e}")))?
    }

    /// Ingest several files concurrently. Results come back in input order
    /// and one failing file does not affect the others.
    pub async fn ingest_many(
        self: &Arc<Self>,
        paths: Vec<PathBuf>,
    ) -> Vec<(PathBuf, Result<Document, DocSearchError>)> {
        let mut set = JoinSet::new();
        for (index, path) in paths.into_iter().enumerate() {
            let store = Arc::clone(self);
            set.spawn(async move {
                let result = store.ingest_async(path.clone()).await;
                (index, path, result)
            });
        }

        let mut results = Vec::with_capacity(set.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(outcome) => results.push(outcome),
                Err(e) => tracing::error!(error = %e, "ingestion task aborted"),
            }
        }
        results.sort_by_key(|(index, _, _)| *index);
        results
            .into_iter()
            .map(|(_, path, result)| (path, result))
            .collect()
    }

    /// Remove by path (case-insensitive). Removing an unknown path is a no-op.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let key = path_key(path.as_ref());
        let mut documents = self.write();
        let before = documents.len();
        documents.retain(|d| !d.has_path(&key));
        self.unreadable_mut().retain(|info| !same_path(info.path.trim(), &key));
        if documents.len() != before {
            tracing::debug!(path = %key, "removed document");
        }
        self.persist(&documents);
    }

    /// Snapshot of every document, in ingestion order.
    pub fn list(&self) -> Vec<Document> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Search a snapshot of the current documents.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        search::search(query, &self.read())
    }

    /// Re-extract every document named in the metadata file.
    ///
    /// Entries that are blank or point at missing files are skipped and
    /// dropped from the list. A file that fails to extract is counted and
    /// logged without stopping the rest, and its entry is kept. The list is
    /// written back once, only if something was loaded.
    pub fn reload_persisted(&self) -> ReloadSummary {
        let mut summary = ReloadSummary::default();
        let mut loaded = Vec::new();

        for info in self.metadata.load() {
            let path = Path::new(info.path.trim());
            if info.path.trim().is_empty() || !path.is_file() {
                tracing::debug!(path = %info.path, "skipping missing document");
                summary.skipped += 1;
                continue;
            }
            match self.build_document(path) {
                Ok(document) => loaded.push(document),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not reload document");
                    summary.failed += 1;
                    let mut unreadable = self.unreadable_mut();
                    unreadable.retain(|kept| !same_path(&kept.path, &info.path));
                    unreadable.push(info);
                }
            }
        }

        summary.loaded = loaded.len();
        if !loaded.is_empty() {
            let mut documents = self.write();
            for document in loaded {
                replace(&mut documents, document);
            }
            self.persist(&documents);
        }

        tracing::info!(
            loaded = summary.loaded,
            skipped = summary.skipped,
            failed = summary.failed,
            "reloaded document list"
        );
        summary
    }

    fn build_document(&self, path: &Path) -> Result<Document, DocSearchError> {
        if !path.is_file() {
            return Err(DocSearchError::FileNotFound(path.to_path_buf()));
        }
        let path = std::path::absolute(path)?;
        let size = std::fs::metadata(&path)?.len();

        let extracted = match self.registry.parser_for(&path) {
            Some(parser) => parser.extract(&path)?,
            None => {
                tracing::debug!(path = %path.display(), "unsupported format, no content extracted");
                Extracted::default()
            }
        };

        let document = Document {
            path: path.to_string_lossy().into_owned(),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            extension: path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
                .unwrap_or_default(),
            size,
            ingested_at: Local::now(),
            raw_text: extracted.text,
            records: extracted.records,
        };
        tracing::debug!(
            path = %document.path,
            records = document.records.len(),
            chars = document.raw_text.len(),
            "ingested document"
        );
        Ok(document)
    }

    /// Save `documents` together with the entries that failed to reload.
    /// Called with the documents write lock held.
    fn persist(&self, documents: &[Document]) {
        let mut list = infos(documents);
        let unreadable = self.unreadable.read().unwrap_or_else(PoisonError::into_inner);
        list.extend(
            unreadable
                .iter()
                .filter(|info| !documents.iter().any(|d| d.has_path(&info.path)))
                .cloned(),
        );
        self.metadata.save(&list);
    }

    fn unreadable_mut(&self) -> RwLockWriteGuard<'_, Vec<DocumentInfo>> {
        self.unreadable.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Document>> {
        self.documents.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Document>> {
        self.documents.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn replace(documents: &mut Vec<Document>, document: Document) {
    documents.retain(|d| !d.has_path(&document.path));
    documents.push(document);
}

fn infos(documents: &[Document]) -> Vec<DocumentInfo> {
    documents.iter().map(Document::info).collect()
}

/// Stored paths are absolute; relative removal requests are resolved the same way.
fn path_key(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::layout::LineLayout;
    use crate::extraction::{PageContent, PdfExtractor};

    struct NoPdf;

    impl PdfExtractor for NoPdf {
        fn extract_pages(&self, _: &[u8]) -> Result<Vec<PageContent>, DocSearchError> {
            Err(DocSearchError::PdftotextNotFound)
        }

        fn backend_name(&self) -> &str {
            "none"
        }
    }

    fn store(dir: &Path) -> DocumentStore {
        DocumentStore::new(
            FormatRegistry::with_backends(Arc::new(NoPdf), None, LineLayout::default()),
            MetadataFile::new(dir.join("documents.json")),
        )
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = store(dir.path()).ingest(dir.path().join("yok.pdf")).unwrap_err();
        assert!(matches!(err, DocSearchError::FileNotFound(_)));
    }

    #[test]
    fn unsupported_format_has_empty_content() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notlar.TXT");
        std::fs::write(&file, "Kazı").unwrap();

        let doc = store(dir.path()).ingest(&file).unwrap();
        assert_eq!(doc.name, "notlar.TXT");
        assert_eq!(doc.extension, ".txt");
        assert_eq!(doc.size, 4);
        assert!(doc.raw_text.is_empty());
        assert!(doc.records.is_empty());
    }

    #[test]
    fn remove_is_case_insensitive_and_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();
        let s = store(dir.path());
        let doc = s.ingest(&file).unwrap();

        s.remove(doc.path.to_uppercase());
        assert!(s.is_empty());
        s.remove(&file);
        assert!(s.is_empty());
        assert!(s.metadata_file().load().is_empty());
    }

    #[test]
    fn reload_skips_blank_and_missing_entries() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kept.txt");
        std::fs::write(&kept, "x").unwrap();
        let gone = dir.path().join("gone.txt");
        std::fs::write(&gone, "y").unwrap();

        let first = store(dir.path());
        first.ingest(&kept).unwrap();
        first.ingest(&gone).unwrap();
        std::fs::remove_file(&gone).unwrap();

        let mut infos = first.metadata_file().load();
        infos.push(DocumentInfo {
            path: "  ".into(),
            ..infos[0].clone()
        });
        first.metadata_file().try_save(&infos).unwrap();

        let second = store(dir.path());
        let summary = second.reload_persisted();
        assert_eq!(
            summary,
            ReloadSummary {
                loaded: 1,
                skipped: 2,
                failed: 0
            }
        );
        assert_eq!(second.list()[0].name, "kept.txt");
        assert_eq!(second.metadata_file().load().len(), 1);
    }

    #[test]
    fn reload_keeps_entries_that_fail_to_extract() {
        let dir = tempfile::tempdir().unwrap();
        let ok = dir.path().join("ok.txt");
        std::fs::write(&ok, "x").unwrap();
        let broken = dir.path().join("fiyat.xlsx");
        std::fs::write(&broken, "not a workbook").unwrap();

        let first = store(dir.path());
        first.ingest(&ok).unwrap();
        let mut infos = first.metadata_file().load();
        infos.push(DocumentInfo {
            path: broken.to_string_lossy().into_owned(),
            name: "fiyat.xlsx".into(),
            extension: ".xlsx".into(),
            ..infos[0].clone()
        });
        first.metadata_file().try_save(&infos).unwrap();

        let second = store(dir.path());
        let summary = second.reload_persisted();
        assert_eq!(
            summary,
            ReloadSummary {
                loaded: 1,
                skipped: 0,
                failed: 1
            }
        );
        assert_eq!(second.len(), 1);
        assert_eq!(second.metadata_file().load().len(), 2);

        // Later writes keep the entry too.
        let more = dir.path().join("more.txt");
        std::fs::write(&more, "y").unwrap();
        second.ingest(&more).unwrap();
        let names: Vec<String> = second
            .metadata_file()
            .load()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["ok.txt", "more.txt", "fiyat.xlsx"]);

        second.remove(&broken);
        assert_eq!(second.metadata_file().load().len(), 2);
    }

    #[test]
    fn reload_with_nothing_loadable_keeps_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone.txt");
        std::fs::write(&gone, "y").unwrap();
        store(dir.path()).ingest(&gone).unwrap();
        std::fs::remove_file(&gone).unwrap();

        let s = store(dir.path());
        assert_eq!(s.reload_persisted().skipped, 1);
        assert_eq!(s.metadata_file().load().len(), 1);
    }

    #[tokio::test]
    async fn ingest_many_keeps_input_order_and_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "a").unwrap();
        std::fs::write(&b, "b").unwrap();
        let missing = dir.path().join("missing.txt");

        let s = Arc::new(store(dir.path()));
        let results = s
            .ingest_many(vec![a.clone(), missing.clone(), b.clone()])
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, a);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(DocSearchError::FileNotFound(_))));
        assert!(results[2].1.is_ok());
        assert_eq!(s.len(), 2);
    }
}
