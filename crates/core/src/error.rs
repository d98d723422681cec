use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetrievalError {
    #[error("invalid argument: chunk size must be positive, got {0}")]
    InvalidChunkSize(usize),

    #[error("invalid argument: top_k must be positive, got {0}")]
    InvalidTopK(usize),

    #[error("regex error: {0}")]
    Tokenizer(String),
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("HTTP {status} - {body}")]
    BackendResponse { status: u16, body: String },

    #[error("connection error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no response received from model")]
    EmptyResponse,

    #[error("prompt is empty")]
    EmptyPrompt,

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
