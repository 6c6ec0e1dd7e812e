pub mod header;
pub mod normalize;
pub mod pdf;
pub mod sheet;
pub mod values;
pub mod word;

use std::path::Path;

use crate::model::PriceRecord;

/// The document a record is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub path: String,
    pub name: String,
}

impl Origin {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Origin {
            path: path.into(),
            name: name.into(),
        }
    }

    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Origin::new(path.to_string_lossy(), name)
    }

    /// Empty record on `page`, attributed to this document.
    pub(crate) fn record(&self, page: u32) -> PriceRecord {
        PriceRecord {
            document_path: self.path.clone(),
            document_name: self.name.clone(),
            page,
            ..Default::default()
        }
    }
}
