use crate::domain::model::Document;
use crate::domain::ports::{DocumentLoader, TextSplitter};
use crate::loaders::{ensure_exists, load_error, FileType};
use crate::utils::error::{DocumentError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// One document per page, with 0-based `page` and `total_pages` metadata.
#[derive(Debug, Clone)]
pub struct PdfLoader {
    path: PathBuf,
}

impl PdfLoader {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            path: ensure_exists(path.as_ref())?,
        })
    }

    async fn read(&self) -> Result<Vec<Document>> {
        let bytes = tokio::fs::read(&self.path).await?;

        let pages = tokio::task::spawn_blocking(move || extract_pages(&bytes))
            .await
            .map_err(|e| DocumentError::file_load(format!("PDF worker failed: {}", e)))??;

        let total_pages = pages.len();
        tracing::debug!("Loaded {} ({} pages)", self.path.display(), total_pages);

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(page, text)| {
                let mut doc = Document::from_source(text, &self.path);
                doc.metadata.insert("page".to_string(), page.into());
                doc.metadata
                    .insert("total_pages".to_string(), total_pages.into());
                doc
            })
            .collect())
    }
}

#[async_trait]
impl DocumentLoader for PdfLoader {
    fn file_type(&self) -> FileType {
        FileType::Pdf
    }

    async fn load(&self) -> Result<Vec<Document>> {
        self.read()
            .await
            .map_err(|e| load_error(FileType::Pdf, false, e))
    }

    async fn load_and_split(&self, splitter: &dyn TextSplitter) -> Result<Vec<Document>> {
        let pages = self
            .read()
            .await
            .map_err(|e| load_error(FileType::Pdf, true, e))?;
        Ok(splitter.split_documents(&pages))
    }
}

/// Text of every page, in page order.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>> {
    let doc = lopdf::Document::load_mem(bytes)?;
    if doc.is_encrypted() {
        return Err(DocumentError::file_load("document is encrypted"));
    }

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(DocumentError::file_load("document has no pages"));
    }

    pages
        .keys()
        .map(|&number| doc.extract_text(&[number]).map_err(DocumentError::from))
        .collect()
}
