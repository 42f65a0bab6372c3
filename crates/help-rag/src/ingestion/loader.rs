//! Source loading: turns an ingestion request into plain text

use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::DataType;

/// Upper bound for a single PDF text extraction
const PDF_EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

/// Text extracted from a source, ready for chunking
#[derive(Debug, Clone)]
pub struct LoadedSource {
    /// Normalised text content
    pub content: String,
    /// SHA-256 of `content`, hex encoded
    pub content_hash: String,
}

/// Loads sources by data type
pub struct SourceLoader;

impl SourceLoader {
    /// Load a source and extract its text
    pub async fn load(source: &str, data_type: DataType) -> Result<LoadedSource> {
        let raw = match data_type {
            DataType::PdfFile => Self::extract_pdf(source).await?,
            DataType::Text => source.to_string(),
        };

        let content = normalize_text(&raw);
        if content.is_empty() {
            return Err(Error::file_parse(
                source_name(source, data_type),
                "No text content could be extracted",
            ));
        }

        Ok(LoadedSource {
            content_hash: hash_content(&content),
            content,
        })
    }

    /// Read a PDF from disk and extract its text off the async runtime
    async fn extract_pdf(path: &str) -> Result<String> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| Error::file_parse(path, format!("Failed to read file: {}", e)))?;

        if !data.starts_with(b"%PDF") {
            return Err(Error::file_parse(path, "File is not a PDF document"));
        }

        let extraction =
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data));

        match tokio::time::timeout(PDF_EXTRACT_TIMEOUT, extraction).await {
            Ok(Ok(Ok(text))) => Ok(cleanup_pdf_text(&text)),
            Ok(Ok(Err(e))) => Err(Error::file_parse(path, e.to_string())),
            Ok(Err(e)) => Err(Error::Internal(format!("PDF extraction task failed: {}", e))),
            Err(_) => {
                tracing::error!(
                    "PDF extraction timeout after {:?} for {}",
                    PDF_EXTRACT_TIMEOUT,
                    path
                );
                Err(Error::file_parse(path, "PDF extraction timed out"))
            }
        }
    }
}

/// Name used for a source in error messages
fn source_name(source: &str, data_type: DataType) -> String {
    match data_type {
        DataType::PdfFile => source.to_string(),
        DataType::Text => "text".to_string(),
    }
}

/// Replace ligatures and typographic characters pdf-extract leaves behind
fn cleanup_pdf_text(text: &str) -> String {
    text.replace('\0', "")
        .replace('\u{00A0}', " ")  // Non-breaking space
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2010}', '\u{2011}', '\u{2013}'], "-")
}

/// Trim lines and drop empty ones
fn normalize_text(text: &str) -> String {
    text.lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// SHA-256 content hash used for deduplication
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether a path looks like something the PDF loader will accept
pub fn is_pdf_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
