use crate::error::RetrievalError;

pub const DEFAULT_CHUNK_SIZE: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub words_per_chunk: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            words_per_chunk: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ChunkingConfig {
    pub fn new(words_per_chunk: usize) -> Result<Self, RetrievalError> {
        if words_per_chunk == 0 {
            return Err(RetrievalError::InvalidChunkSize(words_per_chunk));
        }
        Ok(Self { words_per_chunk })
    }
}

pub fn chunk_text(text: &str, chunk_size: usize) -> Result<Vec<String>, RetrievalError> {
    let config = ChunkingConfig::new(chunk_size)?;
    Ok(chunk_with_config(text, config))
}

pub fn chunk_with_config(text: &str, config: ChunkingConfig) -> Vec<String> {
    let words = text.split_whitespace().collect::<Vec<_>>();

    words
        .chunks(config.words_per_chunk)
        .map(|window| window.join(" "))
        .collect()
}
