use crate::config::processor::DocumentProcessorConfig;
use crate::core::engine::IngestReport;
use crate::core::Storage;
use crate::domain::model::Document;
use crate::loaders::FileType;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    #[default]
    Jsonl,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Jsonl => "jsonl",
            Self::Csv => "csv",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub generated_at: DateTime<Utc>,
    pub split: bool,
    pub processor: &'a DocumentProcessorConfig,
    pub total_documents: usize,
    pub files: Vec<ManifestEntry>,
}

#[derive(Debug, Serialize)]
pub struct ManifestEntry {
    pub path: String,
    pub file_type: Option<FileType>,
    pub documents: usize,
    pub error: Option<String>,
}

impl<'a> Manifest<'a> {
    pub fn new(report: &IngestReport, processor: &'a DocumentProcessorConfig, split: bool) -> Self {
        let files = report
            .outcomes
            .iter()
            .map(|outcome| ManifestEntry {
                path: outcome.path.display().to_string(),
                file_type: FileType::from_path(&outcome.path).ok(),
                documents: outcome.documents().len(),
                error: outcome.result.as_ref().err().map(ToString::to_string),
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            split,
            processor,
            total_documents: report.total_documents(),
            files,
        }
    }
}

/// Renders every successfully processed document. `chunk_index` in CSV
/// output counts from 0 within each input file.
pub fn render(report: &IngestReport, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Json => {
            let docs: Vec<&Document> = report.documents().collect();
            Ok(serde_json::to_vec_pretty(&docs)?)
        }
        OutputFormat::Jsonl => {
            let mut out = Vec::new();
            for doc in report.documents() {
                serde_json::to_writer(&mut out, doc)?;
                out.push(b'\n');
            }
            Ok(out)
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(["source", "page", "start_index", "chunk_index", "page_content"])?;

            for outcome in &report.outcomes {
                for (chunk_index, doc) in outcome.documents().iter().enumerate() {
                    writer.write_record([
                        doc.source().unwrap_or_default().to_string(),
                        doc.page().map(|p| p.to_string()).unwrap_or_default(),
                        doc.start_index().map(|i| i.to_string()).unwrap_or_default(),
                        chunk_index.to_string(),
                        doc.page_content.clone(),
                    ])?;
                }
            }

            writer
                .into_inner()
                .map_err(|e| std::io::Error::other(e.to_string()).into())
        }
    }
}

pub struct OutputWriter<S: Storage> {
    storage: S,
    format: OutputFormat,
    compress: bool,
    filename: String,
}

impl<S: Storage> OutputWriter<S> {
    pub fn new(storage: S, format: OutputFormat, compress: bool, filename: impl Into<String>) -> Self {
        Self {
            storage,
            format,
            compress,
            filename: filename.into(),
        }
    }

    pub fn data_file(&self) -> String {
        format!("{}.{}", self.filename, self.format.extension())
    }

    /// Writes the rendered documents and the manifest, returning the names
    /// of the files written relative to the storage root.
    pub async fn write(&self, report: &IngestReport, manifest: &Manifest<'_>) -> Result<Vec<String>> {
        let data = render(report, self.format)?;
        let manifest_json = serde_json::to_vec_pretty(manifest)?;

        if self.compress {
            let archive_name = format!("{}.zip", self.filename);

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

                zip.start_file(self.data_file(), SimpleFileOptions::default())?;
                zip.write_all(&data)?;

                zip.start_file(MANIFEST_FILE, SimpleFileOptions::default())?;
                zip.write_all(&manifest_json)?;

                zip.finish()?.into_inner()
            };

            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(&archive_name, &zip_data).await?;
            Ok(vec![archive_name])
        } else {
            let data_file = self.data_file();
            self.storage.write_file(&data_file, &data).await?;
            self.storage.write_file(MANIFEST_FILE, &manifest_json).await?;
            Ok(vec![data_file, MANIFEST_FILE.to_string()])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::FileOutcome;
    use crate::domain::model::Metadata;
    use crate::utils::error::DocumentError;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.get_file(path).await.ok_or_else(|| {
                DocumentError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, path.to_string()))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn chunk(source: &str, page: Option<u64>, text: &str) -> Document {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), source.into());
        if let Some(page) = page {
            metadata.insert("page".to_string(), page.into());
        }
        Document::with_metadata(text, metadata)
    }

    fn sample_report() -> IngestReport {
        IngestReport {
            outcomes: vec![
                FileOutcome {
                    path: PathBuf::from("a.pdf"),
                    result: Ok(vec![
                        chunk("a.pdf", Some(0), "first, page"),
                        chunk("a.pdf", Some(1), "second \"page\""),
                    ]),
                },
                FileOutcome {
                    path: PathBuf::from("b.txt"),
                    result: Ok(vec![chunk("b.txt", None, "plain")]),
                },
                FileOutcome {
                    path: PathBuf::from("c.docx"),
                    result: Err(DocumentError::file_load("broken")),
                },
            ],
        }
    }

    #[test]
    fn test_render_jsonl() {
        let out = String::from_utf8(render(&sample_report(), OutputFormat::Jsonl).unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: Document = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.page_content, "first, page");
        assert_eq!(first.page(), Some(0));
    }

    #[test]
    fn test_render_csv() {
        let out = render(&sample_report(), OutputFormat::Csv).unwrap();
        let mut reader = csv::Reader::from_reader(out.as_slice());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "a.pdf");
        assert_eq!(&rows[1][1], "1");
        assert_eq!(&rows[1][3], "1");
        assert_eq!(&rows[1][4], "second \"page\"");
        assert_eq!(&rows[2][0], "b.txt");
        assert_eq!(&rows[2][1], "");
        assert_eq!(&rows[2][3], "0");
    }

    #[tokio::test]
    async fn test_write_plain_files() {
        let storage = MockStorage::default();
        let writer = OutputWriter::new(storage.clone(), OutputFormat::Json, false, "chunks");
        let report = sample_report();
        let config = DocumentProcessorConfig::default();
        let manifest = Manifest::new(&report, &config, true);

        let written = writer.write(&report, &manifest).await.unwrap();
        assert_eq!(written, vec!["chunks.json", "manifest.json"]);

        let docs: Vec<Document> =
            serde_json::from_slice(&storage.get_file("chunks.json").await.unwrap()).unwrap();
        assert_eq!(docs.len(), 3);

        let manifest: serde_json::Value =
            serde_json::from_slice(&storage.get_file("manifest.json").await.unwrap()).unwrap();
        assert_eq!(manifest["total_documents"], 3);
        assert_eq!(manifest["processor"]["chunk_size"], 100);
        assert_eq!(manifest["files"][0]["file_type"], "pdf");
        assert_eq!(manifest["files"][2]["error"], "broken");
    }

    #[tokio::test]
    async fn test_write_zip_bundle() {
        let storage = MockStorage::default();
        let writer = OutputWriter::new(storage.clone(), OutputFormat::Csv, true, "batch");
        let report = sample_report();
        let config = DocumentProcessorConfig::default();
        let manifest = Manifest::new(&report, &config, true);

        let written = writer.write(&report, &manifest).await.unwrap();
        assert_eq!(written, vec!["batch.zip"]);

        let zip_data = storage.get_file("batch.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(names.contains(&"batch.csv"));
        assert!(names.contains(&"manifest.json"));

        let mut csv_file = archive.by_name("batch.csv").unwrap();
        let mut content = String::new();
        std::io::Read::read_to_string(&mut csv_file, &mut content).unwrap();
        assert!(content.starts_with("source,page,start_index,chunk_index,page_content"));
    }
}
