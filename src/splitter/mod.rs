pub mod recursive;

pub use recursive::{KeepSeparator, RecursiveCharacterTextSplitter, DEFAULT_SEPARATORS};
