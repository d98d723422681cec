pub mod ollama;

pub use ollama::{OllamaClient, StreamAccumulator};
