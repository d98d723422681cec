use crate::ingest::ingest_pdf;
use crate::prompt::build_prompt;
use crate::ranking::{rank_chunks, RankedChunk};
use crate::traits::ChatBackend;
use crate::{ChatError, ChatMessage, ChatOptions, IngestError, IngestedDocument, Session};
use tracing::{info, warn};

pub const GREETING: &str = "Hello! I'm your assistant. Ask me anything!";

#[derive(Debug, Clone)]
pub struct Reply {
    pub message: ChatMessage,
    pub context: Vec<RankedChunk>,
    pub answered: bool,
}

pub struct ChatOrchestrator<B>
where
    B: ChatBackend,
{
    backend: B,
    options: ChatOptions,
}

impl<B> ChatOrchestrator<B>
where
    B: ChatBackend + Send + Sync,
{
    pub fn new(backend: B, options: ChatOptions) -> Self {
        Self { backend, options }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    pub fn load_document(
        &self,
        session: &mut Session,
        bytes: &[u8],
        title: &str,
    ) -> Result<usize, IngestError> {
        let document = ingest_pdf(bytes, title, self.options.chunk_size)?;
        Ok(self.attach_document(session, document))
    }

    pub fn attach_document(&self, session: &mut Session, document: IngestedDocument) -> usize {
        let count = document.chunks.len();
        session.pdf_chunks = document.chunks;
        session.document = Some(document.fingerprint);
        count
    }

    pub async fn ask(&self, session: &mut Session, prompt: &str) -> Result<Reply, ChatError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ChatError::EmptyPrompt);
        }

        let context = if session.has_document() {
            rank_chunks(prompt, &session.pdf_chunks, self.options.top_k)?
        } else {
            Vec::new()
        };

        session.messages.push(ChatMessage::user(prompt));

        let texts = context
            .iter()
            .map(|ranked| ranked.text.clone())
            .collect::<Vec<_>>();
        let full_prompt = build_prompt(prompt, &texts);

        info!(
            session = %session.id,
            model = %self.options.model,
            context_chunks = context.len(),
            "asking model"
        );

        let (content, answered) = match self.backend.complete(&self.options.model, &full_prompt).await
        {
            Ok(text) => (text, true),
            Err(error) => {
                warn!(session = %session.id, %error, "model request failed");
                (describe_failure(&error), false)
            }
        };

        let message = ChatMessage::assistant(content);
        session.messages.push(message.clone());

        Ok(Reply {
            message,
            context,
            answered,
        })
    }

    pub fn clear(&self, session: &mut Session) {
        session.clear();
    }
}

pub fn describe_failure(error: &ChatError) -> String {
    match error {
        ChatError::BackendResponse { status, body } => format!("Error: HTTP {status} - {body}"),
        ChatError::Http(error) => format!("Connection error: {error}"),
        ChatError::EmptyResponse => "No response received from model.".to_string(),
        other => format!("Error: {other}"),
    }
}
