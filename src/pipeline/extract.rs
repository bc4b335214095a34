//! Text extraction: PDF bytes → plain text via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, whose calls block and are not
//! safe to run on an async worker thread. The whole bind → load → read
//! sequence therefore runs on Tokio's blocking pool.
//!
//! ## Empty documents
//!
//! Scanned or image-only PDFs open fine but contain no text layer. That is
//! detected here, in [`extract_text`], so the pipeline stops before it spends
//! a model call on an empty prompt.

use crate::config::QuizConfig;
use crate::error::QuizError;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// Converts document bytes to plain text.
///
/// Implementations may return an empty string; [`extract_text`] turns that
/// into [`QuizError::NoExtractableText`].
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, bytes: Vec<u8>) -> Result<String, QuizError>;
}

/// Run `extractor` and reject output with no non-whitespace text.
///
/// The returned text is trimmed at both ends.
pub async fn extract_text(
    extractor: &dyn TextExtractor,
    bytes: Vec<u8>,
) -> Result<String, QuizError> {
    let text = extractor.extract(bytes).await?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(QuizError::NoExtractableText);
    }
    info!("Extracted {} characters of text", trimmed.chars().count());
    Ok(trimmed.to_string())
}

/// Check the `%PDF` signature before handing bytes to pdfium.
pub fn ensure_pdf_magic(bytes: &[u8]) -> Result<(), QuizError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        return Err(QuizError::NotAPdf {
            magic: bytes.iter().take(4).copied().collect(),
        });
    }
    Ok(())
}

/// [`TextExtractor`] backed by pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    library_path: Option<PathBuf>,
}

impl PdfiumExtractor {
    /// Bind to the library at `library_path`, or the system library if None.
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self { library_path }
    }

    /// Resolve the library from the config, then `PDFIUM_LIB_PATH`.
    pub fn from_config(config: &QuizConfig) -> Self {
        let library_path = config.pdfium_library_path.clone().or_else(|| {
            std::env::var("PDFIUM_LIB_PATH")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
        });
        Self::new(library_path)
    }
}

#[async_trait]
impl TextExtractor for PdfiumExtractor {
    async fn extract(&self, bytes: Vec<u8>) -> Result<String, QuizError> {
        ensure_pdf_magic(&bytes)?;
        let library_path = self.library_path.clone();

        tokio::task::spawn_blocking(move || extract_blocking(library_path, bytes))
            .await
            .map_err(|e| QuizError::CorruptPdf {
                detail: format!("Extraction task panicked: {}", e),
            })?
    }
}

fn bind(library_path: Option<&PathBuf>) -> Result<Pdfium, QuizError> {
    let bindings = match library_path {
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| QuizError::PdfiumBindingFailed(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

/// Blocking implementation of text extraction.
fn extract_blocking(library_path: Option<PathBuf>, bytes: Vec<u8>) -> Result<String, QuizError> {
    let pdfium = bind(library_path.as_ref())?;

    let document = pdfium.load_pdf_from_byte_vec(bytes, None).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            QuizError::CorruptPdf {
                detail: "document is password-protected".into(),
            }
        } else {
            QuizError::CorruptPdf { detail: err_str }
        }
    })?;

    let pages = document.pages();
    debug!("PDF loaded: {} pages", pages.len());

    let mut text = String::new();
    for (idx, page) in pages.iter().enumerate() {
        let page_text = page.text().map_err(|e| QuizError::CorruptPdf {
            detail: format!("page {}: {:?}", idx + 1, e),
        })?;
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&page_text.all());
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    #[async_trait]
    impl TextExtractor for Fixed {
        async fn extract(&self, _bytes: Vec<u8>) -> Result<String, QuizError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn magic_accepts_pdf_header() {
        assert!(ensure_pdf_magic(b"%PDF-1.7\n...").is_ok());
    }

    #[test]
    fn magic_rejects_html_and_short_input() {
        match ensure_pdf_magic(b"<html>") {
            Err(QuizError::NotAPdf { magic }) => assert_eq!(magic, b"<htm".to_vec()),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
        assert!(ensure_pdf_magic(b"%P").is_err());
    }

    #[tokio::test]
    async fn whitespace_only_text_is_an_extraction_error() {
        let err = extract_text(&Fixed(" \n\t \n"), vec![]).await.unwrap_err();
        assert!(matches!(err, QuizError::NoExtractableText));
    }

    #[tokio::test]
    async fn text_is_trimmed() {
        let text = extract_text(&Fixed("\n  Chapter 1  \n"), vec![]).await.unwrap();
        assert_eq!(text, "Chapter 1");
    }

    #[tokio::test]
    async fn pdfium_extractor_rejects_non_pdf_before_binding() {
        let extractor = PdfiumExtractor::new(Some(PathBuf::from("/nonexistent/libpdfium.so")));
        let err = extractor.extract(b"GIF89a".to_vec()).await.unwrap_err();
        assert!(matches!(err, QuizError::NotAPdf { .. }));
    }
}
