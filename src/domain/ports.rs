use crate::domain::model::Document;
use crate::loaders::FileType;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait TextSplitter: Send + Sync {
    fn split_text(&self, text: &str) -> Vec<String>;

    fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        documents
            .iter()
            .flat_map(|doc| {
                self.split_text(&doc.page_content)
                    .into_iter()
                    .map(|chunk| Document::with_metadata(chunk, doc.metadata.clone()))
            })
            .collect()
    }
}

#[async_trait]
pub trait DocumentLoader: Send + Sync {
    fn file_type(&self) -> FileType;

    async fn load(&self) -> Result<Vec<Document>>;

    async fn load_and_split(&self, splitter: &dyn TextSplitter) -> Result<Vec<Document>>;
}
