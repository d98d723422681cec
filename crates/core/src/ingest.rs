use crate::chunking::chunk_text;
use crate::extractor::{join_pages, LopdfExtractor, PdfExtractor};
use crate::{DocumentFingerprint, IngestError, IngestedDocument};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::info;

pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub fn ingest_pdf(
    bytes: &[u8],
    title: &str,
    chunk_size: usize,
) -> Result<IngestedDocument, IngestError> {
    ingest_with(&LopdfExtractor, bytes, title, chunk_size)
}

pub fn ingest_with<E: PdfExtractor>(
    extractor: &E,
    bytes: &[u8],
    title: &str,
    chunk_size: usize,
) -> Result<IngestedDocument, IngestError> {
    let pages = extractor.extract_pages(bytes)?;
    let text = join_pages(&pages);
    let chunks = chunk_text(&text, chunk_size)?;

    let fingerprint = DocumentFingerprint {
        title: title.to_string(),
        checksum: digest_bytes(bytes),
        page_count: pages.len(),
        word_count: text.split_whitespace().count(),
        ingested_at: Utc::now(),
    };

    info!(
        title = %fingerprint.title,
        pages = fingerprint.page_count,
        words = fingerprint.word_count,
        chunks = chunks.len(),
        "pdf ingested"
    );

    Ok(IngestedDocument {
        fingerprint,
        chunks,
    })
}

pub fn ingest_pdf_file(path: &Path, chunk_size: usize) -> Result<IngestedDocument, IngestError> {
    let title = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| IngestError::MissingFileName(path.display().to_string()))?;
    let bytes = fs::read(path)?;
    ingest_pdf(&bytes, title, chunk_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::tests::sample_pdf;
    use crate::extractor::PageText;
    use crate::RetrievalError;
    use std::fs;
    use tempfile::tempdir;

    struct FixedPages(Vec<&'static str>);

    impl PdfExtractor for FixedPages {
        fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<PageText>, IngestError> {
            Ok(self
                .0
                .iter()
                .enumerate()
                .map(|(index, text)| PageText {
                    number: index as u32 + 1,
                    text: text.to_string(),
                })
                .collect())
        }
    }

    #[test]
    fn checksum_is_reproducible() {
        assert_eq!(digest_bytes(b"abc"), digest_bytes(b"abc"));
        assert_ne!(digest_bytes(b"abc"), digest_bytes(b"abd"));
    }

    #[test]
    fn pages_are_joined_before_chunking() {
        let extractor = FixedPages(vec!["one two three", "four five"]);
        let document = ingest_with(&extractor, b"pdf", "manual.pdf", 2).unwrap();

        assert_eq!(document.chunks, vec!["one two", "three four", "five"]);
        assert_eq!(document.fingerprint.page_count, 2);
        assert_eq!(document.fingerprint.word_count, 5);
        assert_eq!(document.fingerprint.title, "manual.pdf");
    }

    #[test]
    fn textless_document_has_no_chunks() {
        let extractor = FixedPages(vec!["", "  "]);
        let document = ingest_with(&extractor, b"pdf", "scan.pdf", 500).unwrap();
        assert!(document.chunks.is_empty());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let extractor = FixedPages(vec!["text"]);
        let result = ingest_with(&extractor, b"pdf", "x.pdf", 0);
        assert!(matches!(
            result,
            Err(IngestError::Retrieval(RetrievalError::InvalidChunkSize(0)))
        ));
    }

    #[test]
    fn file_ingestion_uses_file_name_as_title() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("pump-manual.pdf");
        fs::write(&path, sample_pdf(&["Pump pressure limits"]))?;

        let document = ingest_pdf_file(&path, 500)?;
        assert_eq!(document.fingerprint.title, "pump-manual.pdf");
        assert_eq!(document.chunks.len(), 1);
        assert!(document.chunks[0].contains("Pump"));
        Ok(())
    }

    #[test]
    fn unreadable_pdf_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"%PDF-1.4\n%broken")?;

        let result = ingest_pdf_file(&path, 500);
        assert!(matches!(result, Err(IngestError::PdfParse(_))));
        Ok(())
    }
}
