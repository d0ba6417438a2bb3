use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Unsupported file type: {extension}")]
    UnsupportedFileType { extension: String },

    #[error("{message}")]
    FileLoad { message: String },

    #[error("{message}")]
    InvalidConfiguration { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("PDF parsing error: {0}")]
    PdfError(#[from] lopdf::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid separator pattern: {0}")]
    RegexError(#[from] regex::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Parsing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DocumentError {
    pub fn file_load(message: impl Into<String>) -> Self {
        Self::FileLoad {
            message: message.into(),
        }
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FileNotFound { .. } | Self::UnsupportedFileType { .. } | Self::FileLoad { .. } => {
                ErrorCategory::Input
            }
            Self::InvalidConfiguration { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::RegexError(_) => ErrorCategory::Configuration,
            Self::ZipError(_) | Self::XmlError(_) | Self::PdfError(_) | Self::CsvError(_) => {
                ErrorCategory::Parsing
            }
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Parsing => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::FileNotFound { .. } => "Check that the input path exists and is readable",
            Self::UnsupportedFileType { .. } => "Only .pdf, .docx and .txt files are supported",
            Self::FileLoad { .. } => "Verify the file is not corrupted or password protected",
            Self::InvalidConfiguration { .. } => {
                "Use a positive chunk_size and a chunk_overlap smaller than it"
            }
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Review the configuration file and CLI flags",
            Self::RegexError(_) => "Fix the separator pattern or disable is_separator_regex",
            Self::ZipError(_) | Self::XmlError(_) => "Re-save the document as a standard .docx file",
            Self::PdfError(_) => "Re-export the PDF or check that it is not encrypted",
            Self::CsvError(_) | Self::SerializationError(_) => "Try a different output format",
            Self::IoError(_) => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Could not process document: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Parsing => format!("Could not parse document: {}", self),
            ErrorCategory::System => format!("Unexpected error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocumentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = DocumentError::FileNotFound {
            path: PathBuf::from("missing.pdf"),
        };
        assert_eq!(err.to_string(), "File not found: missing.pdf");

        let err = DocumentError::UnsupportedFileType {
            extension: ".xyz".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported file type: .xyz");

        let err = DocumentError::invalid_configuration("chunk_size must be positive");
        assert_eq!(err.to_string(), "chunk_size must be positive");
    }

    #[test]
    fn test_category_and_severity() {
        let err = DocumentError::file_load("boom");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = DocumentError::invalid_configuration("bad");
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);

        let err = DocumentError::from(std::io::Error::other("disk"));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().starts_with("Unexpected error"));
    }
}
