pub mod docx;
pub mod pdf;
pub mod text;

pub use docx::DocxLoader;
pub use pdf::PdfLoader;
pub use text::TextLoader;

use crate::domain::ports::DocumentLoader;
use crate::utils::error::{DocumentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Docx,
    Txt,
}

impl FileType {
    /// Matches the lowercased extension; no content sniffing.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "txt" => Ok(Self::Txt),
            "" => Err(DocumentError::UnsupportedFileType {
                extension: String::new(),
            }),
            other => Err(DocumentError::UnsupportedFileType {
                extension: format!(".{}", other),
            }),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Txt => "TXT",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn is_supported(path: &Path) -> bool {
    FileType::from_path(path).is_ok()
}

/// Options that only some loaders look at.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoaderOptions {
    /// Decode invalid UTF-8 in text files as U+FFFD instead of failing.
    pub lossy_text: bool,
}

pub struct DocumentLoaderFactory;

impl DocumentLoaderFactory {
    pub fn create_loader(path: impl AsRef<Path>) -> Result<Box<dyn DocumentLoader>> {
        Self::create_loader_with(path, LoaderOptions::default())
    }

    pub fn create_loader_with(
        path: impl AsRef<Path>,
        options: LoaderOptions,
    ) -> Result<Box<dyn DocumentLoader>> {
        let path = path.as_ref();
        ensure_exists(path)?;

        let loader: Box<dyn DocumentLoader> = match FileType::from_path(path)? {
            FileType::Pdf => Box::new(PdfLoader::new(path)?),
            FileType::Docx => Box::new(DocxLoader::new(path)?),
            FileType::Txt => Box::new(TextLoader::new(path)?.lossy(options.lossy_text)),
        };

        tracing::debug!("Created {} loader for {}", loader.file_type(), path.display());
        Ok(loader)
    }
}

pub fn create_loader(path: impl AsRef<Path>) -> Result<Box<dyn DocumentLoader>> {
    DocumentLoaderFactory::create_loader(path)
}

pub(crate) fn ensure_exists(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        Ok(path.to_path_buf())
    } else {
        Err(DocumentError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Wraps a loader failure with the format and the operation that failed.
pub(crate) fn load_error(file_type: FileType, splitting: bool, err: DocumentError) -> DocumentError {
    let operation = if splitting {
        "loading and splitting"
    } else {
        "loading"
    };
    DocumentError::file_load(format!(
        "Error {} {} file: {}",
        operation,
        file_type.label(),
        err
    ))
}
