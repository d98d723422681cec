use crate::error::RetrievalError;
use regex::Regex;
use std::collections::HashMap;

const TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    weights: HashMap<usize, f64>,
}

impl SparseVector {
    pub fn get(&self, term: usize) -> f64 {
        self.weights.get(&term).copied().unwrap_or(0.0)
    }

    pub fn norm(&self) -> f64 {
        self.weights
            .values()
            .map(|weight| weight * weight)
            .sum::<f64>()
            .sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (small, large) = if self.weights.len() <= other.weights.len() {
            (self, other)
        } else {
            (other, self)
        };

        small
            .weights
            .iter()
            .map(|(term, weight)| weight * large.get(*term))
            .sum()
    }

    fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for weight in self.weights.values_mut() {
                *weight /= norm;
            }
        }
    }
}

pub fn cosine_similarity(left: &SparseVector, right: &SparseVector) -> f64 {
    let denominator = left.norm() * right.norm();
    if denominator == 0.0 {
        return 0.0;
    }
    (left.dot(right) / denominator).clamp(0.0, 1.0)
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    token_re: Regex,
}

#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    pub rows: Vec<SparseVector>,
}

impl TfidfVectorizer {
    pub fn new() -> Result<Self, RetrievalError> {
        let token_re =
            Regex::new(TOKEN_PATTERN).map_err(|error| RetrievalError::Tokenizer(error.to_string()))?;
        Ok(Self { token_re })
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.token_re
            .find_iter(&lowered)
            .map(|token| token.as_str().to_string())
            .collect()
    }

    pub fn fit_transform(&self, documents: &[&str]) -> TfidfMatrix {
        let mut vocabulary = HashMap::<String, usize>::new();
        let mut counts = Vec::with_capacity(documents.len());

        for document in documents {
            let mut term_counts = HashMap::<usize, f64>::new();
            for token in self.tokenize(document) {
                let next_id = vocabulary.len();
                let term = *vocabulary.entry(token).or_insert(next_id);
                *term_counts.entry(term).or_insert(0.0) += 1.0;
            }
            counts.push(term_counts);
        }

        let mut document_frequency = vec![0usize; vocabulary.len()];
        for term_counts in &counts {
            for term in term_counts.keys() {
                document_frequency[*term] += 1;
            }
        }

        // smoothed idf: ln((1 + n) / (1 + df)) + 1
        let n = documents.len() as f64;
        let idf = document_frequency
            .iter()
            .map(|df| ((1.0 + n) / (1.0 + *df as f64)).ln() + 1.0)
            .collect::<Vec<_>>();

        let rows = counts
            .into_iter()
            .map(|term_counts| {
                let mut row = SparseVector {
                    weights: term_counts
                        .into_iter()
                        .map(|(term, count)| (term, count * idf[term]))
                        .collect(),
                };
                row.normalize();
                row
            })
            .collect();

        TfidfMatrix {
            vocabulary,
            idf,
            rows,
        }
    }
}
