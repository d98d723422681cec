pub mod backends;
pub mod chunking;
pub mod error;
pub mod extractor;
pub mod ingest;
pub mod models;
pub mod orchestrator;
pub mod prompt;
pub mod ranking;
pub mod tfidf;
pub mod traits;

pub use backends::{OllamaClient, StreamAccumulator};
pub use chunking::{chunk_text, ChunkingConfig, DEFAULT_CHUNK_SIZE};
pub use error::{ChatError, IngestError, RetrievalError};
pub use extractor::{
    extract_text_from_path, extract_text_from_pdf, LopdfExtractor, PageText, PdfExtractor,
};
pub use ingest::{digest_bytes, ingest_pdf, ingest_pdf_file, ingest_with};
pub use models::{
    ChatMessage, ChatOptions, DocumentFingerprint, IngestedDocument, Role, Session,
    DEFAULT_MODEL, DEFAULT_OLLAMA_HOST,
};
pub use orchestrator::{describe_failure, ChatOrchestrator, Reply, GREETING};
pub use prompt::build_prompt;
pub use ranking::{get_relevant_chunks, rank_chunks, RankedChunk, DEFAULT_TOP_K};
pub use tfidf::{cosine_similarity, SparseVector, TfidfMatrix, TfidfVectorizer};
pub use traits::ChatBackend;
