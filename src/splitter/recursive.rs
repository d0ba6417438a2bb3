use crate::domain::model::Document;
use crate::domain::ports::TextSplitter;
use crate::utils::error::{DocumentError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Where a matched separator ends up after splitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeepSeparator {
    /// Prepended to the following piece.
    #[default]
    Start,
    /// Appended to the preceding piece.
    End,
    /// Dropped; pieces are re-joined with the separator when merged.
    None,
}

#[derive(Debug, Clone)]
struct Separator {
    raw: String,
    // None for the empty separator, which splits into single chars.
    pattern: Option<Regex>,
}

/// Splits text by trying a list of separators in order, recursing into
/// pieces that are still too long, then merging small pieces back into
/// chunks of at most `chunk_size` chars with `chunk_overlap` chars of
/// trailing context carried into the next chunk.
#[derive(Debug, Clone)]
pub struct RecursiveCharacterTextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<Separator>,
    keep_separator: KeepSeparator,
    strip_whitespace: bool,
    add_start_index: bool,
}

impl RecursiveCharacterTextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(DocumentError::invalid_configuration(
                "chunk_size must be positive",
            ));
        }
        if chunk_overlap > chunk_size {
            return Err(DocumentError::invalid_configuration(format!(
                "Got a larger chunk overlap ({}) than chunk size ({}), should be smaller.",
                chunk_overlap, chunk_size
            )));
        }

        let separators = compile_separators(&DEFAULT_SEPARATORS.map(String::from), false)?;

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators,
            keep_separator: KeepSeparator::default(),
            strip_whitespace: true,
            add_start_index: false,
        })
    }

    /// Replaces the separator list. With `is_regex` each entry is compiled
    /// as a regular expression, otherwise it is matched literally.
    pub fn with_separators(mut self, separators: &[String], is_regex: bool) -> Result<Self> {
        self.separators = compile_separators(separators, is_regex)?;
        Ok(self)
    }

    pub fn with_keep_separator(mut self, keep_separator: KeepSeparator) -> Self {
        self.keep_separator = keep_separator;
        self
    }

    pub fn with_strip_whitespace(mut self, strip_whitespace: bool) -> Self {
        self.strip_whitespace = strip_whitespace;
        self
    }

    pub fn with_add_start_index(mut self, add_start_index: bool) -> Self {
        self.add_start_index = add_start_index;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    fn split_recursive(&self, text: &str, separators: &[Separator]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        let (separator, remaining) = pick_separator(text, separators);

        let splits = match separator {
            Some(sep) => split_on(text, sep, self.keep_separator),
            None => vec![text],
        };

        let merge_separator = match (separator, self.keep_separator) {
            (Some(sep), KeepSeparator::None) => sep.raw.as_str(),
            _ => "",
        };

        let mut good_splits: Vec<&str> = Vec::new();
        for piece in splits {
            if char_len(piece) < self.chunk_size {
                good_splits.push(piece);
                continue;
            }

            if !good_splits.is_empty() {
                final_chunks.extend(self.merge_splits(&good_splits, merge_separator));
                good_splits.clear();
            }

            if remaining.is_empty() {
                final_chunks.push(piece.to_string());
            } else {
                final_chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits, merge_separator));
        }

        final_chunks
    }

    fn merge_splits(&self, splits: &[&str], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in splits {
            let len = char_len(piece);
            let joined_sep = if current.is_empty() { 0 } else { separator_len };

            if total + len + joined_sep > self.chunk_size {
                if total > self.chunk_size {
                    tracing::warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total,
                        self.chunk_size
                    );
                }

                if !current.is_empty() {
                    if let Some(doc) = self.join_docs(&current, separator) {
                        docs.push(doc);
                    }

                    // Drop from the front until what is left fits as overlap
                    // and leaves room for the incoming piece.
                    while total > self.chunk_overlap
                        || (total > 0
                            && total
                                + len
                                + if current.is_empty() { 0 } else { separator_len }
                                > self.chunk_size)
                    {
                        let Some(front) = current.pop_front() else {
                            break;
                        };
                        let dropped_sep = if current.is_empty() { 0 } else { separator_len };
                        total = total.saturating_sub(char_len(front) + dropped_sep);
                    }
                }
            }

            current.push_back(piece);
            total += len + if current.len() > 1 { separator_len } else { 0 };
        }

        if let Some(doc) = self.join_docs(&current, separator) {
            docs.push(doc);
        }

        docs
    }

    fn join_docs(&self, docs: &VecDeque<&str>, separator: &str) -> Option<String> {
        let joined = docs.iter().copied().collect::<Vec<_>>().join(separator);
        let text = if self.strip_whitespace {
            joined.trim().to_string()
        } else {
            joined
        };
        (!text.is_empty()).then_some(text)
    }
}

impl TextSplitter for RecursiveCharacterTextSplitter {
    fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        let mut chunks = Vec::new();

        for doc in documents {
            let text = &doc.page_content;
            let mut index: i64 = 0;
            let mut previous_chunk_len = 0usize;

            for chunk in self.split_text(text) {
                let mut metadata = doc.metadata.clone();

                if self.add_start_index {
                    // A chunk re-joined with a regex separator may not occur
                    // in the text; it gets -1 and the search carries on from there.
                    let offset = index + previous_chunk_len as i64 - self.chunk_overlap as i64;
                    index = find_from_char(text, &chunk, offset.max(0) as usize)
                        .map_or(-1, |found| found as i64);
                    metadata.insert("start_index".to_string(), index.into());
                    previous_chunk_len = char_len(&chunk);
                }

                chunks.push(Document::with_metadata(chunk, metadata));
            }
        }

        chunks
    }
}

fn compile_separators(separators: &[String], is_regex: bool) -> Result<Vec<Separator>> {
    separators
        .iter()
        .map(|raw| -> Result<Separator> {
            let pattern = if raw.is_empty() {
                None
            } else if is_regex {
                Some(Regex::new(raw)?)
            } else {
                Some(Regex::new(&regex::escape(raw))?)
            };
            Ok(Separator {
                raw: raw.clone(),
                pattern,
            })
        })
        .collect()
}

/// First separator present in `text`, plus the separators after it. The
/// empty separator always matches. When nothing matches, the last
/// separator is used with no further fallbacks.
fn pick_separator<'a>(
    text: &str,
    separators: &'a [Separator],
) -> (Option<&'a Separator>, &'a [Separator]) {
    for (i, sep) in separators.iter().enumerate() {
        match &sep.pattern {
            None => return (Some(sep), &[]),
            Some(re) if re.is_match(text) => return (Some(sep), &separators[i + 1..]),
            Some(_) => {}
        }
    }
    (separators.last(), &[])
}

fn split_on<'t>(text: &'t str, separator: &Separator, keep: KeepSeparator) -> Vec<&'t str> {
    let Some(re) = &separator.pattern else {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    };

    let mut pieces = Vec::new();
    let mut last = 0;
    match keep {
        KeepSeparator::Start => {
            for m in re.find_iter(text) {
                pieces.push(&text[last..m.start()]);
                last = m.start();
            }
            pieces.push(&text[last..]);
        }
        KeepSeparator::End => {
            for m in re.find_iter(text) {
                pieces.push(&text[last..m.end()]);
                last = m.end();
            }
            pieces.push(&text[last..]);
        }
        KeepSeparator::None => pieces.extend(re.split(text)),
    }

    pieces.retain(|p| !p.is_empty());
    pieces
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Char index of `needle` in `haystack`, searching from char offset `from`.
fn find_from_char(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let byte_from = haystack
        .char_indices()
        .nth(from)
        .map(|(b, _)| b)
        .unwrap_or(haystack.len());
    let found = haystack[byte_from..].find(needle)?;
    Some(from + char_len(&haystack[byte_from..byte_from + found]))
}
