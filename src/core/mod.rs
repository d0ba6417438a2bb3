pub mod engine;
pub mod output;
pub mod processor;

pub use crate::domain::model::{Document, Metadata};
pub use crate::domain::ports::{DocumentLoader, Storage, TextSplitter};
pub use crate::utils::error::Result;
