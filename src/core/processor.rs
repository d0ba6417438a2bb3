use crate::config::processor::DocumentProcessorConfig;
use crate::domain::model::Document;
use crate::loaders::{DocumentLoaderFactory, LoaderOptions};
use crate::utils::error::{DocumentError, Result};
use std::path::Path;

/// Single entry point for turning a file into documents or chunks.
#[derive(Debug, Clone, Default)]
pub struct DocumentProcessor {
    config: DocumentProcessorConfig,
    loader_options: LoaderOptions,
}

impl DocumentProcessor {
    pub fn new(config: Option<DocumentProcessorConfig>) -> Self {
        Self {
            config: config.unwrap_or_default(),
            loader_options: LoaderOptions::default(),
        }
    }

    pub fn with_loader_options(mut self, loader_options: LoaderOptions) -> Self {
        self.loader_options = loader_options;
        self
    }

    pub fn config(&self) -> &DocumentProcessorConfig {
        &self.config
    }

    /// Every failure comes back as `FileLoad`. Missing and unsupported
    /// files are reported as processing failures; anything raised while
    /// loading or splitting is reported as unexpected.
    pub async fn process_document(
        &self,
        path: impl AsRef<Path>,
        load_and_split: bool,
    ) -> Result<Vec<Document>> {
        let path = path.as_ref();

        match self.run(path, load_and_split).await {
            Ok(docs) => {
                tracing::info!(
                    "Processed {} into {} {}",
                    path.display(),
                    docs.len(),
                    if load_and_split { "chunks" } else { "documents" }
                );
                Ok(docs)
            }
            Err(e @ (DocumentError::FileNotFound { .. } | DocumentError::UnsupportedFileType { .. })) => {
                Err(DocumentError::file_load(format!(
                    "Document processing failed: {}",
                    e
                )))
            }
            Err(e) => Err(DocumentError::file_load(format!(
                "Unexpected error during document processing: {}",
                e
            ))),
        }
    }

    async fn run(&self, path: &Path, load_and_split: bool) -> Result<Vec<Document>> {
        let loader = DocumentLoaderFactory::create_loader_with(path, self.loader_options)?;

        if load_and_split {
            let splitter = self.config.create_text_splitter()?;
            loader.load_and_split(&splitter).await
        } else {
            loader.load().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file() {
        let processor = DocumentProcessor::new(None);
        let err = processor
            .process_document("missing/report.pdf", true)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Document processing failed: File not found: missing/report.pdf"
        );
    }

    #[tokio::test]
    async fn test_unsupported_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("slides.pptx");
        std::fs::write(&path, b"PK").unwrap();

        let err = DocumentProcessor::new(None)
            .process_document(&path, false)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Document processing failed: Unsupported file type: .pptx"
        );
    }

    #[tokio::test]
    async fn test_loader_failure_is_unexpected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"not a zip").unwrap();

        let err = DocumentProcessor::new(None)
            .process_document(&path, true)
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::FileLoad { .. }));
        assert!(err
            .to_string()
            .starts_with("Unexpected error during document processing: Error loading and splitting DOCX file:"));
    }

    #[tokio::test]
    async fn test_split_and_unsplit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("story.txt");
        std::fs::write(&path, "word ".repeat(60)).unwrap();

        let config = DocumentProcessorConfig::new(50, 10).unwrap();
        let processor = DocumentProcessor::new(Some(config));

        let whole = processor.process_document(&path, false).await.unwrap();
        assert_eq!(whole.len(), 1);

        let chunks = processor.process_document(&path, true).await.unwrap();
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.char_len() <= 50));
    }
}
