use crate::error::RetrievalError;
use crate::tfidf::{cosine_similarity, TfidfVectorizer};
use serde::Serialize;
use tracing::debug;

pub const DEFAULT_TOP_K: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedChunk {
    pub index: usize,
    pub score: f64,
    pub text: String,
}

/// Scores are only comparable within one call. Equal scores keep the
/// chunks' input order.
pub fn rank_chunks(
    query: &str,
    chunks: &[String],
    top_k: usize,
) -> Result<Vec<RankedChunk>, RetrievalError> {
    if top_k == 0 {
        return Err(RetrievalError::InvalidTopK(top_k));
    }
    if chunks.is_empty() {
        return Ok(Vec::new());
    }

    let vectorizer = TfidfVectorizer::new()?;
    let corpus = std::iter::once(query)
        .chain(chunks.iter().map(String::as_str))
        .collect::<Vec<_>>();
    let matrix = vectorizer.fit_transform(&corpus);

    // row 0 is the query
    let query_row = &matrix.rows[0];
    let chunk_rows = &matrix.rows[1..];

    let mut scored = chunk_rows
        .iter()
        .enumerate()
        .map(|(index, row)| (index, cosine_similarity(query_row, row)))
        .collect::<Vec<_>>();

    scored.sort_by(|left, right| right.1.total_cmp(&left.1).then(left.0.cmp(&right.0)));
    scored.truncate(top_k);

    debug!(
        chunk_count = chunks.len(),
        vocabulary = matrix.vocabulary.len(),
        returned = scored.len(),
        best_score = scored.first().map(|(_, score)| *score).unwrap_or_default(),
        "ranked chunks"
    );

    Ok(scored
        .into_iter()
        .map(|(index, score)| RankedChunk {
            index,
            score,
            text: chunks[index].clone(),
        })
        .collect())
}

pub fn get_relevant_chunks(
    query: &str,
    chunks: &[String],
    top_k: usize,
) -> Result<Vec<String>, RetrievalError> {
    Ok(rank_chunks(query, chunks, top_k)?
        .into_iter()
        .map(|ranked| ranked.text)
        .collect())
}
