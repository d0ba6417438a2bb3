pub mod config;
pub mod core;
pub mod domain;
pub mod loaders;
pub mod splitter;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::cli::LocalStorage;
pub use config::processor::DocumentProcessorConfig;
pub use config::toml_config::TomlConfig;
pub use config::{IngestSettings, OutputSettings};
pub use core::engine::{FileOutcome, IngestEngine, IngestReport};
pub use core::output::{Manifest, OutputFormat, OutputWriter};
pub use core::processor::DocumentProcessor;
pub use domain::model::{Document, Metadata};
pub use domain::ports::{DocumentLoader, Storage, TextSplitter};
pub use loaders::{create_loader, DocumentLoaderFactory, FileType};
pub use splitter::{KeepSeparator, RecursiveCharacterTextSplitter};
pub use utils::error::{DocumentError, Result};
