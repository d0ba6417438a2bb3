use crate::config::processor::{DocumentProcessorConfig, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::config::{IngestSettings, OutputSettings, DEFAULT_CONCURRENCY, MAX_CONCURRENCY};
use crate::core::output::OutputFormat;
use crate::loaders::{LoaderOptions, SUPPORTED_EXTENSIONS};
use crate::splitter::KeepSeparator;
use crate::utils::error::{DocumentError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    // Literal pattern; cannot fail to compile.
    Regex::new(r"\$\{([^}]+)\}").unwrap()
});

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub processor: ProcessorSection,
    pub input: InputSection,
    pub output: Option<OutputSection>,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorSection {
    // Signed so that negative values reach validation instead of failing to parse.
    pub chunk_size: Option<i64>,
    pub chunk_overlap: Option<i64>,
    pub separators: Option<Vec<String>>,
    pub keep_separator: Option<KeepSeparator>,
    pub is_separator_regex: Option<bool>,
    pub strip_whitespace: Option<bool>,
    pub add_start_index: Option<bool>,
    pub split: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSection {
    pub paths: Vec<String>,
    pub recursive: Option<bool>,
    pub lossy_text: Option<bool>,
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub path: String,
    pub format: Option<OutputFormat>,
    pub compress: Option<bool>,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: bool,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses after replacing `${VAR}` with the environment value. Unset
    /// variables are left as written.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| DocumentError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn processor_config(&self) -> Result<DocumentProcessorConfig> {
        let p = &self.processor;
        let mut config = DocumentProcessorConfig::from_signed(
            p.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE as i64),
            p.chunk_overlap.unwrap_or(DEFAULT_CHUNK_OVERLAP as i64),
        )?;

        if p.separators.is_some() || p.is_separator_regex.is_some() {
            // The regex flag applies to the default separators when none are listed.
            let separators = p.separators.clone().unwrap_or_else(|| config.separators.clone());
            config = config.with_separators(separators, p.is_separator_regex.unwrap_or(false));
        }
        if let Some(keep) = p.keep_separator {
            config = config.with_keep_separator(keep);
        }
        if let Some(strip) = p.strip_whitespace {
            config = config.with_strip_whitespace(strip);
        }
        if let Some(add) = p.add_start_index {
            config = config.with_add_start_index(add);
        }

        Ok(config)
    }

    pub fn concurrency(&self) -> usize {
        self.input.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn output_settings(&self) -> Option<OutputSettings> {
        self.output.as_ref().map(|o| OutputSettings {
            path: PathBuf::from(&o.path),
            format: o.format.unwrap_or_default(),
            compress: o.compress.unwrap_or(false),
            filename: o
                .filename
                .clone()
                .unwrap_or_else(|| OutputSettings::DEFAULT_FILENAME.to_string()),
        })
    }

    pub fn into_settings(self) -> Result<IngestSettings> {
        self.validate()?;
        Ok(IngestSettings {
            inputs: self.input.paths.iter().map(PathBuf::from).collect(),
            processor: self.processor_config()?,
            split: self.processor.split.unwrap_or(true),
            loader: LoaderOptions {
                lossy_text: self.input.lossy_text.unwrap_or(false),
            },
            recursive: self.input.recursive.unwrap_or(false),
            concurrency: self.concurrency(),
            output: self.output_settings(),
            monitor: self.monitoring_enabled(),
        })
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.processor_config()?.validate()?;

        validation::validate_range("input.concurrency", self.concurrency(), 1, MAX_CONCURRENCY)?;
        for path in &self.input.paths {
            validation::validate_path("input.paths", path)?;
        }
        // Entries with an extension name files; the rest may be directories.
        let files: Vec<String> = self
            .input
            .paths
            .iter()
            .filter(|p| Path::new(p).extension().is_some())
            .cloned()
            .collect();
        validation::validate_file_extensions("input.paths", &files, &SUPPORTED_EXTENSIONS)?;

        if let Some(output) = &self.output {
            validation::validate_path("output.path", &output.path)?;
            if let Some(filename) = &output.filename {
                validation::validate_non_empty_string("output.filename", filename)?;
            }
        }

        Ok(())
    }
}
