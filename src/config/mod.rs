pub mod cli;
pub mod processor;
pub mod toml_config;

use crate::config::processor::DocumentProcessorConfig;
use crate::core::output::OutputFormat;
use crate::loaders::LoaderOptions;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::path::PathBuf;

#[cfg(feature = "cli")]
use crate::config::toml_config::TomlConfig;
#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const MAX_CONCURRENCY: usize = 256;

/// Everything one ingestion run needs, after merging the config file and
/// command-line flags.
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub inputs: Vec<PathBuf>,
    pub processor: DocumentProcessorConfig,
    pub split: bool,
    pub loader: LoaderOptions,
    pub recursive: bool,
    pub concurrency: usize,
    pub output: Option<OutputSettings>,
    pub monitor: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub compress: bool,
    pub filename: String,
}

impl OutputSettings {
    pub const DEFAULT_FILENAME: &'static str = "chunks";
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            processor: DocumentProcessorConfig::default(),
            split: true,
            loader: LoaderOptions::default(),
            recursive: false,
            concurrency: DEFAULT_CONCURRENCY,
            output: None,
            monitor: false,
        }
    }
}

impl Validate for IngestSettings {
    fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(crate::utils::error::DocumentError::MissingConfigError {
                field: "inputs".to_string(),
            });
        }
        self.processor.validate()?;
        validation::validate_range("concurrency", self.concurrency, 1, MAX_CONCURRENCY)?;
        if let Some(output) = &self.output {
            validation::validate_path("output.path", &output.path.to_string_lossy())?;
            validation::validate_non_empty_string("output.filename", &output.filename)?;
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "doc-loader")]
#[command(about = "Load PDF, DOCX and TXT documents and split them into chunks")]
pub struct CliConfig {
    /// Files or directories to load
    #[arg(value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// TOML configuration file; flags given here override it
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub chunk_size: Option<usize>,

    #[arg(long)]
    pub chunk_overlap: Option<usize>,

    #[arg(long, help = "Load documents without splitting them")]
    pub no_split: bool,

    #[arg(long, help = "Record each chunk's char offset in its source")]
    pub add_start_index: bool,

    #[arg(long, help = "Decode invalid UTF-8 in text files instead of failing")]
    pub lossy: bool,

    #[arg(long, short, help = "Descend into subdirectories")]
    pub recursive: bool,

    #[arg(long, short, help = "Directory to write chunks to")]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    #[arg(long, help = "Bundle output files into a zip archive")]
    pub compress: bool,

    #[arg(long)]
    pub concurrency: Option<usize>,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn resolve(&self) -> Result<IngestSettings> {
        let mut settings = match &self.config {
            Some(path) => TomlConfig::from_file(path)?.into_settings()?,
            None => IngestSettings::default(),
        };

        if !self.inputs.is_empty() {
            settings.inputs = self.inputs.clone();
        }

        if self.chunk_size.is_some() || self.chunk_overlap.is_some() {
            let current = &settings.processor;
            let resized = DocumentProcessorConfig::new(
                self.chunk_size.unwrap_or(current.chunk_size()),
                self.chunk_overlap.unwrap_or(current.chunk_overlap()),
            )?
            .with_separators(current.separators.clone(), current.is_separator_regex)
            .with_keep_separator(current.keep_separator)
            .with_strip_whitespace(current.strip_whitespace)
            .with_add_start_index(current.add_start_index);
            settings.processor = resized;
        }

        if self.add_start_index {
            settings.processor.add_start_index = true;
        }
        if self.no_split {
            settings.split = false;
        }
        if self.lossy {
            settings.loader.lossy_text = true;
        }
        if self.recursive {
            settings.recursive = true;
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency;
        }
        if self.monitor {
            settings.monitor = true;
        }

        if let Some(path) = &self.output {
            let mut output = settings.output.take().unwrap_or(OutputSettings {
                path: path.clone(),
                format: OutputFormat::default(),
                compress: false,
                filename: OutputSettings::DEFAULT_FILENAME.to_string(),
            });
            output.path = path.clone();
            settings.output = Some(output);
        }
        if let Some(output) = settings.output.as_mut() {
            if let Some(format) = self.format {
                output.format = format;
            }
            if self.compress {
                output.compress = true;
            }
        }

        settings.validate()?;
        Ok(settings)
    }
}
