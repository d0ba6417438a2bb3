use crate::splitter::{KeepSeparator, RecursiveCharacterTextSplitter, DEFAULT_SEPARATORS};
use crate::utils::error::{DocumentError, Result};
use crate::utils::validation::Validate;
use serde::Serialize;

pub const DEFAULT_CHUNK_SIZE: usize = 100;
pub const DEFAULT_CHUNK_OVERLAP: usize = 20;

/// Chunking options shared by every document a processor handles.
///
/// `chunk_size` and `chunk_overlap` are only settable through the
/// validating constructors, so a value of this type always satisfies
/// `0 <= chunk_overlap < chunk_size`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentProcessorConfig {
    chunk_size: usize,
    chunk_overlap: usize,
    pub separators: Vec<String>,
    pub keep_separator: KeepSeparator,
    pub is_separator_regex: bool,
    pub strip_whitespace: bool,
    pub add_start_index: bool,
}

impl DocumentProcessorConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(DocumentError::invalid_configuration(
                "chunk_size must be positive",
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(DocumentError::invalid_configuration(
                "chunk_overlap must be smaller than chunk_size",
            ));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.map(String::from).to_vec(),
            keep_separator: KeepSeparator::default(),
            is_separator_regex: false,
            strip_whitespace: true,
            add_start_index: false,
        })
    }

    /// For sizes that come from signed external input such as TOML.
    pub fn from_signed(chunk_size: i64, chunk_overlap: i64) -> Result<Self> {
        let chunk_size = usize::try_from(chunk_size)
            .map_err(|_| DocumentError::invalid_configuration("chunk_size must be positive"))?;
        if chunk_size == 0 {
            return Err(DocumentError::invalid_configuration(
                "chunk_size must be positive",
            ));
        }
        let chunk_overlap = usize::try_from(chunk_overlap).map_err(|_| {
            DocumentError::invalid_configuration("chunk_overlap cannot be negative")
        })?;
        Self::new(chunk_size, chunk_overlap)
    }

    pub fn with_separators(mut self, separators: Vec<String>, is_regex: bool) -> Self {
        self.separators = separators;
        self.is_separator_regex = is_regex;
        self
    }

    pub fn with_keep_separator(mut self, keep_separator: KeepSeparator) -> Self {
        self.keep_separator = keep_separator;
        self
    }

    pub fn with_strip_whitespace(mut self, strip_whitespace: bool) -> Self {
        self.strip_whitespace = strip_whitespace;
        self
    }

    pub fn with_add_start_index(mut self, add_start_index: bool) -> Self {
        self.add_start_index = add_start_index;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn create_text_splitter(&self) -> Result<RecursiveCharacterTextSplitter> {
        Ok(
            RecursiveCharacterTextSplitter::new(self.chunk_size, self.chunk_overlap)?
                .with_separators(&self.separators, self.is_separator_regex)?
                .with_keep_separator(self.keep_separator)
                .with_strip_whitespace(self.strip_whitespace)
                .with_add_start_index(self.add_start_index),
        )
    }
}

impl Default for DocumentProcessorConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: DEFAULT_SEPARATORS.map(String::from).to_vec(),
            keep_separator: KeepSeparator::default(),
            is_separator_regex: false,
            strip_whitespace: true,
            add_start_index: false,
        }
    }
}

impl Validate for DocumentProcessorConfig {
    fn validate(&self) -> Result<()> {
        if self.separators.is_empty() {
            return Err(DocumentError::invalid_configuration(
                "separators must contain at least one entry",
            ));
        }
        // Compiles the separators as well as checking sizes.
        self.create_text_splitter().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::TextSplitter;

    #[test]
    fn test_defaults() {
        let config = DocumentProcessorConfig::default();
        assert_eq!(config.chunk_size(), 100);
        assert_eq!(config.chunk_overlap(), 20);
        assert_eq!(config.separators, vec!["\n\n", "\n", " ", ""]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_messages() {
        let err = DocumentProcessorConfig::new(0, 0).unwrap_err();
        assert_eq!(err.to_string(), "chunk_size must be positive");

        let err = DocumentProcessorConfig::from_signed(10, -1).unwrap_err();
        assert_eq!(err.to_string(), "chunk_overlap cannot be negative");

        let err = DocumentProcessorConfig::new(10, 10).unwrap_err();
        assert_eq!(err.to_string(), "chunk_overlap must be smaller than chunk_size");

        let err = DocumentProcessorConfig::from_signed(-5, 0).unwrap_err();
        assert_eq!(err.to_string(), "chunk_size must be positive");

        assert!(DocumentProcessorConfig::new(150, 30).is_ok());
    }

    #[test]
    fn test_sizes_beyond_i64() {
        let config = DocumentProcessorConfig::new(usize::MAX, 10).unwrap();
        assert_eq!(config.chunk_size(), usize::MAX);

        let err = DocumentProcessorConfig::new(usize::MAX, usize::MAX).unwrap_err();
        assert_eq!(err.to_string(), "chunk_overlap must be smaller than chunk_size");
    }

    #[test]
    fn test_creates_configured_splitter() {
        let config = DocumentProcessorConfig::new(150, 30).unwrap();
        let splitter = config.create_text_splitter().unwrap();
        assert_eq!(splitter.chunk_size(), 150);
        assert_eq!(splitter.chunk_overlap(), 30);

        let config = DocumentProcessorConfig::new(5, 0)
            .unwrap()
            .with_separators(vec![",".to_string()], false)
            .with_keep_separator(KeepSeparator::None);
        let splitter = config.create_text_splitter().unwrap();
        assert_eq!(splitter.split_text("ab,cd,ef"), vec!["ab,cd", "ef"]);
    }

    #[test]
    fn test_bad_regex_fails_validation() {
        let config = DocumentProcessorConfig::default()
            .with_separators(vec!["[".to_string()], true);
        assert!(matches!(config.validate(), Err(DocumentError::RegexError(_))));
    }
}
