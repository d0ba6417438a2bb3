use crate::core::processor::DocumentProcessor;
use crate::domain::model::Document;
use crate::loaders;
use crate::utils::error::{DocumentError, Result};
use crate::utils::monitor::SystemMonitor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Result of processing one input file.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<Vec<Document>>,
}

impl FileOutcome {
    pub fn documents(&self) -> &[Document] {
        self.result.as_deref().unwrap_or(&[])
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes in the same order as the discovered inputs.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub outcomes: Vec<FileOutcome>,
}

impl IngestReport {
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.outcomes.iter().flat_map(|o| o.documents().iter())
    }

    pub fn total_documents(&self) -> usize {
        self.outcomes.iter().map(|o| o.documents().len()).sum()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }
}

pub struct IngestEngine {
    processor: Arc<DocumentProcessor>,
    split: bool,
    recursive: bool,
    concurrency: usize,
    monitor: SystemMonitor,
}

impl IngestEngine {
    pub fn new(processor: DocumentProcessor) -> Self {
        Self {
            processor: Arc::new(processor),
            split: true,
            recursive: false,
            concurrency: crate::config::DEFAULT_CONCURRENCY,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(processor: DocumentProcessor, monitor_enabled: bool) -> Self {
        Self {
            monitor: SystemMonitor::new(monitor_enabled),
            ..Self::new(processor)
        }
    }

    pub fn split(mut self, split: bool) -> Self {
        self.split = split;
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, Semaphore::MAX_PERMITS);
        self
    }

    pub fn processor(&self) -> &DocumentProcessor {
        &self.processor
    }

    /// Processes every input, at most `concurrency` at a time. A file that
    /// fails is recorded in the report; the run itself only fails when no
    /// input could be found or every input failed.
    pub async fn run(&self, inputs: &[PathBuf]) -> Result<IngestReport> {
        self.monitor.log_stats("Start");

        let paths = discover_inputs(inputs, self.recursive).await?;
        if paths.is_empty() {
            return Err(DocumentError::file_load(
                "No supported documents found in the given inputs",
            ));
        }
        tracing::info!("Processing {} documents", paths.len());

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(paths.len());

        for path in paths {
            let processor = Arc::clone(&self.processor);
            let semaphore = Arc::clone(&semaphore);
            let split = self.split;
            let task_path = path.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| DocumentError::file_load(format!("Worker pool closed: {}", e)))?;
                processor.process_document(&task_path, split).await
            });
            handles.push((path, handle));
        }

        let mut report = IngestReport::default();
        for (path, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(DocumentError::file_load(format!(
                    "Worker for {} failed: {}",
                    path.display(),
                    e
                ))),
            };

            if let Err(e) = &result {
                tracing::warn!("Skipping {}: {}", path.display(), e);
            }
            report.outcomes.push(FileOutcome { path, result });
        }

        self.monitor.log_stats("Processed");

        if report.succeeded() == 0 {
            let first = report
                .failed()
                .next()
                .and_then(|o| o.result.as_ref().err())
                .map(ToString::to_string)
                .unwrap_or_default();
            return Err(DocumentError::file_load(format!(
                "All {} documents failed to process; first error: {}",
                report.outcomes.len(),
                first
            )));
        }

        tracing::info!(
            "Loaded {} documents from {} of {} files",
            report.total_documents(),
            report.succeeded(),
            report.outcomes.len()
        );
        self.monitor.log_final_stats();
        Ok(report)
    }
}

/// Expands directories into the supported files they contain, sorted by
/// path. Explicit file arguments are kept as given, supported or not, so
/// that their failures show up in the report.
pub async fn discover_inputs(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for input in inputs {
        if tokio::fs::metadata(input)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            let mut found = scan_dir(input, recursive).await?;
            found.sort();
            tracing::debug!("Found {} documents in {}", found.len(), input.display());
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }

    Ok(paths)
}

async fn scan_dir(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;

            if file_type.is_dir() {
                if recursive {
                    pending.push(path);
                }
            } else if loaders::is_supported(&path) {
                found.push(path);
            }
        }
    }

    Ok(found)
}
