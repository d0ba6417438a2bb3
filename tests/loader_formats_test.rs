mod common;

use common::{build_docx_with_parts, build_pdf, write_file};
use doc_loader::{
    create_loader, DocumentError, DocumentProcessor, DocumentProcessorConfig, FileType,
    RecursiveCharacterTextSplitter,
};
use tempfile::TempDir;

#[tokio::test]
async fn test_docx_headers_then_body() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "memo.docx",
        &build_docx_with_parts(&["First paragraph.", "Second paragraph."], Some("Company Header"), None),
    );

    let loader = create_loader(&path).unwrap();
    assert_eq!(loader.file_type(), FileType::Docx);

    let docs = loader.load().await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(
        docs[0].page_content,
        "Company Header\n\nFirst paragraph.\n\nSecond paragraph."
    );
    assert_eq!(docs[0].source(), Some(path.display().to_string().as_str()));
}

#[tokio::test]
async fn test_docx_footer_follows_body() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "letter.docx",
        &build_docx_with_parts(
            &["Dear reader,", "Body text."],
            Some("Letterhead"),
            Some("Page footer"),
        ),
    );

    let docs = create_loader(&path).unwrap().load().await.unwrap();
    assert_eq!(
        docs[0].page_content,
        "Letterhead\n\nDear reader,\n\nBody text.\n\nPage footer"
    );
}

#[tokio::test]
async fn test_docx_load_and_split() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "memo.docx",
        &build_docx_with_parts(&["First paragraph.", "Second paragraph."], Some("Company Header"), None),
    );

    let splitter = RecursiveCharacterTextSplitter::new(20, 0).unwrap();
    let chunks = create_loader(&path)
        .unwrap()
        .load_and_split(&splitter)
        .await
        .unwrap();

    let texts: Vec<&str> = chunks.iter().map(|c| c.page_content.as_str()).collect();
    assert_eq!(texts, vec!["Company Header", "First paragraph.", "Second paragraph."]);
    assert!(chunks.iter().all(|c| c.source().is_some()));
}

#[tokio::test]
async fn test_pdf_one_document_per_page() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "report.PDF",
        &build_pdf(&["Hello page one", "Hello page two"]),
    );

    let loader = create_loader(&path).unwrap();
    assert_eq!(loader.file_type(), FileType::Pdf);

    let pages = loader.load().await.unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].page(), Some(0));
    assert_eq!(pages[1].page(), Some(1));
    assert_eq!(pages[1].metadata["total_pages"], 2);
    assert!(pages[0].page_content.contains("page one"));
    assert!(pages[1].page_content.contains("page two"));
}

#[tokio::test]
async fn test_pdf_chunks_keep_page_metadata() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "report.pdf",
        &build_pdf(&["alpha beta gamma delta", "epsilon zeta eta theta"]),
    );

    let config = DocumentProcessorConfig::new(12, 0).unwrap();
    let chunks = DocumentProcessor::new(Some(config))
        .process_document(&path, true)
        .await
        .unwrap();

    assert!(chunks.len() >= 2);
    assert!(chunks.iter().all(|c| c.char_len() <= 12));
    assert_eq!(chunks.first().unwrap().page(), Some(0));
    assert_eq!(chunks.last().unwrap().page(), Some(1));
}

#[tokio::test]
async fn test_corrupt_pdf_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "broken.pdf", b"%PDF-1.4\nthis is not a pdf body");

    let err = create_loader(&path).unwrap().load().await.unwrap_err();
    assert!(matches!(err, DocumentError::FileLoad { .. }));
    assert!(err.to_string().starts_with("Error loading PDF file:"));
}

#[tokio::test]
async fn test_zip_without_document_part() {
    let dir = TempDir::new().unwrap();

    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    zip.start_file("word/styles.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    std::io::Write::write_all(&mut zip, b"<w:styles/>").unwrap();
    let bytes = zip.finish().unwrap().into_inner();
    let path = write_file(dir.path(), "odd.docx", &bytes);

    let err = DocumentProcessor::new(None)
        .process_document(&path, false)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unexpected error during document processing: Error loading DOCX file: archive has no word/document.xml part"
    );
}
