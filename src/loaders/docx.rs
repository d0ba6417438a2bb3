// A .docx file is a zip archive of WordprocessingML parts. Text lives in
// w:t runs inside w:p paragraphs; headers and footers are separate parts.

use crate::domain::model::Document;
use crate::domain::ports::{DocumentLoader, TextSplitter};
use crate::loaders::{ensure_exists, load_error, FileType};
use crate::utils::error::{DocumentError, Result};
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

const MAIN_PART: &str = "word/document.xml";

#[derive(Debug, Clone)]
pub struct DocxLoader {
    path: PathBuf,
}

impl DocxLoader {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            path: ensure_exists(path.as_ref())?,
        })
    }

    async fn read(&self) -> Result<Vec<Document>> {
        let bytes = tokio::fs::read(&self.path).await?;
        let size = bytes.len();

        let text = tokio::task::spawn_blocking(move || extract_text(&bytes))
            .await
            .map_err(|e| DocumentError::file_load(format!("DOCX worker failed: {}", e)))??;

        tracing::debug!(
            "Loaded {} ({} bytes, {} chars of text)",
            self.path.display(),
            size,
            text.chars().count()
        );
        Ok(vec![Document::from_source(text, &self.path)])
    }
}

#[async_trait]
impl DocumentLoader for DocxLoader {
    fn file_type(&self) -> FileType {
        FileType::Docx
    }

    async fn load(&self) -> Result<Vec<Document>> {
        self.read()
            .await
            .map_err(|e| load_error(FileType::Docx, false, e))
    }

    async fn load_and_split(&self, splitter: &dyn TextSplitter) -> Result<Vec<Document>> {
        let docs = self
            .read()
            .await
            .map_err(|e| load_error(FileType::Docx, true, e))?;
        Ok(splitter.split_documents(&docs))
    }
}

/// Plain text of a .docx archive: headers, then the body, then footers.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    // Central directory order, which is also the order parts are read in.
    let names: Vec<String> = (0..archive.len())
        .filter_map(|i| archive.name_for_index(i).map(String::from))
        .collect();
    if !names.iter().any(|n| n == MAIN_PART) {
        return Err(DocumentError::file_load(format!(
            "archive has no {} part",
            MAIN_PART
        )));
    }

    let headers = parts_with_prefix(&names, "word/header");
    let footers = parts_with_prefix(&names, "word/footer");

    let mut text = String::new();
    for part in headers
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(MAIN_PART))
        .chain(footers.iter().map(String::as_str))
    {
        let xml = read_part(&mut archive, part)?;
        text.push_str(&xml_to_text(&xml)?);
    }

    Ok(text.trim().to_string())
}

fn parts_with_prefix(names: &[String], prefix: &str) -> Vec<String> {
    names
        .iter()
        .filter(|n| n.starts_with(prefix) && n.ends_with(".xml"))
        .cloned()
        .collect()
}

fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<String> {
    let mut file = archive.by_name(name)?;
    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Every paragraph opens with a blank line; tabs and breaks map to `\t`
/// and `\n`. Tab stops declared in paragraph properties are not tabs.
fn xml_to_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;
    let mut in_properties = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:pPr" => in_properties = true,
                b"w:p" => out.push_str("\n\n"),
                b"w:tab" if !in_properties => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" => out.push_str("\n\n"),
                b"w:tab" if !in_properties => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:pPr" => in_properties = false,
                _ => {}
            },
            Event::Text(t) if in_text => {
                let unescaped = t.unescape().map_err(quick_xml::Error::from)?;
                out.push_str(&unescaped);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}
