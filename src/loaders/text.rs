use crate::domain::model::Document;
use crate::domain::ports::{DocumentLoader, TextSplitter};
use crate::loaders::{ensure_exists, load_error, FileType};
use crate::utils::error::{DocumentError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Reads a whole UTF-8 file into a single document.
#[derive(Debug, Clone)]
pub struct TextLoader {
    path: PathBuf,
    lossy: bool,
}

impl TextLoader {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            path: ensure_exists(path.as_ref())?,
            lossy: false,
        })
    }

    pub fn lossy(mut self, lossy: bool) -> Self {
        self.lossy = lossy;
        self
    }

    async fn read(&self) -> Result<Vec<Document>> {
        let bytes = tokio::fs::read(&self.path).await?;

        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) if self.lossy => {
                tracing::warn!(
                    "{} is not valid UTF-8 (first bad byte at {}), decoding lossily",
                    self.path.display(),
                    e.utf8_error().valid_up_to()
                );
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
            Err(e) => {
                return Err(DocumentError::file_load(format!(
                    "{} is not valid UTF-8 (first bad byte at {})",
                    self.path.display(),
                    e.utf8_error().valid_up_to()
                )));
            }
        };

        tracing::debug!("Loaded {} ({} bytes)", self.path.display(), text.len());
        Ok(vec![Document::from_source(text, &self.path)])
    }
}

#[async_trait]
impl DocumentLoader for TextLoader {
    fn file_type(&self) -> FileType {
        FileType::Txt
    }

    async fn load(&self) -> Result<Vec<Document>> {
        self.read()
            .await
            .map_err(|e| load_error(FileType::Txt, false, e))
    }

    async fn load_and_split(&self, splitter: &dyn TextSplitter) -> Result<Vec<Document>> {
        let docs = self
            .read()
            .await
            .map_err(|e| load_error(FileType::Txt, true, e))?;
        Ok(splitter.split_documents(&docs))
    }
}
