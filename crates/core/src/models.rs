use crate::chunking::{ChunkingConfig, DEFAULT_CHUNK_SIZE};
use crate::error::RetrievalError;
use crate::ranking::DEFAULT_TOP_K;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "qwen2.5:0.5b";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentFingerprint {
    pub title: String,
    pub checksum: String,
    pub page_count: usize,
    pub word_count: usize,
    pub ingested_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct IngestedDocument {
    pub fingerprint: DocumentFingerprint,
    pub chunks: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub messages: Vec<ChatMessage>,
    pub pdf_chunks: Vec<String>,
    pub document: Option<DocumentFingerprint>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: Vec::new(),
            pdf_chunks: Vec::new(),
            document: None,
        }
    }

    pub fn has_document(&self) -> bool {
        !self.pdf_chunks.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.pdf_chunks.clear();
        self.document = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOptions {
    pub model: String,
    pub top_k: usize,
    pub chunk_size: usize,
}

impl ChatOptions {
    pub fn validate(&self) -> Result<(), RetrievalError> {
        ChunkingConfig::new(self.chunk_size)?;
        if self.top_k == 0 {
            return Err(RetrievalError::InvalidTopK(self.top_k));
        }
        Ok(())
    }
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            top_k: DEFAULT_TOP_K,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let message = ChatMessage::assistant("hi");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "hi");
    }

    #[test]
    fn session_survives_json_export() {
        let mut session = Session::new();
        session.messages.push(ChatMessage::user("What is the relief pressure?"));
        session.messages.push(ChatMessage::assistant("40 psi."));
        session.pdf_chunks.push("relief valve opens at 40 psi".to_string());
        session.document = Some(DocumentFingerprint {
            title: "valve.pdf".to_string(),
            checksum: "abc".to_string(),
            page_count: 2,
            word_count: 6,
            ingested_at: Utc::now(),
        });

        let json = serde_json::to_string_pretty(&session).unwrap();
        let restored: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);

        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "40 psi.");
    }

    #[test]
    fn options_reject_zero_sizes() {
        assert!(ChatOptions::default().validate().is_ok());

        let no_chunks = ChatOptions {
            top_k: 0,
            ..ChatOptions::default()
        };
        assert_eq!(no_chunks.validate(), Err(RetrievalError::InvalidTopK(0)));

        let empty_windows = ChatOptions {
            chunk_size: 0,
            ..ChatOptions::default()
        };
        assert_eq!(
            empty_windows.validate(),
            Err(RetrievalError::InvalidChunkSize(0))
        );
    }

    #[test]
    fn clearing_drops_history_and_document() {
        let mut session = Session::new();
        session.messages.push(ChatMessage::user("hello"));
        session.pdf_chunks.push("chunk".to_string());
        session.document = Some(DocumentFingerprint {
            title: "manual.pdf".to_string(),
            checksum: "abc".to_string(),
            page_count: 1,
            word_count: 1,
            ingested_at: Utc::now(),
        });
        assert!(session.has_document());

        let id = session.id;
        session.clear();

        assert!(session.messages.is_empty());
        assert!(!session.has_document());
        assert!(session.document.is_none());
        assert_eq!(session.id, id);
    }
}
