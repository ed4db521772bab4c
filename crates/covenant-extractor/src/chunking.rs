//! Paragraph-boundary chunking for large documents

use crate::error::ExtractorError;

/// Splits document text into bounded-size chunks along paragraph boundaries
///
/// Two invariants hold for the output:
/// - rejoining the chunks with `"\n\n"` reproduces the input byte-for-byte
/// - no chunk exceeds `max_chunk_size`, except a chunk holding a single
///   paragraph that alone exceeds it (paragraphs are never split)
pub struct DocumentChunker {
    max_chunk_size: usize,
}

impl DocumentChunker {
    /// Create a chunker with the given size bound
    pub fn new(max_chunk_size: usize) -> Self {
        Self { max_chunk_size }
    }

    /// Split text into chunks
    ///
    /// Accumulates paragraphs (separated by double line-breaks) into the
    /// current chunk until adding the next one would exceed the bound, then
    /// closes the chunk and starts a new one.
    ///
    /// # Errors
    ///
    /// `EmptyDocument` for empty or whitespace-only input.
    pub fn split(&self, text: &str) -> Result<Vec<String>, ExtractorError> {
        if text.trim().is_empty() {
            return Err(ExtractorError::EmptyDocument);
        }

        let mut chunks = Vec::new();
        let mut current: Option<String> = None;

        for paragraph in text.split("\n\n") {
            match current {
                None => current = Some(paragraph.to_string()),
                Some(ref mut chunk) => {
                    if chunk.len() + 2 + paragraph.len() > self.max_chunk_size {
                        chunks.push(std::mem::replace(chunk, paragraph.to_string()));
                    } else {
                        chunk.push_str("\n\n");
                        chunk.push_str(paragraph);
                    }
                }
            }
        }

        if let Some(chunk) = current {
            chunks.push(chunk);
        }

        Ok(chunks)
    }
}
