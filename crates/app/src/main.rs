use chrono::Utc;
use clap::{Parser, Subcommand};
use pdf_chat_core::{
    ingest_pdf_file, rank_chunks, ChatBackend, ChatOptions, ChatOrchestrator, OllamaClient,
    Session, DEFAULT_CHUNK_SIZE, DEFAULT_MODEL, DEFAULT_OLLAMA_HOST, DEFAULT_TOP_K,
    GREETING,
};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-chat", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Ollama server base URL
    #[arg(long, env = "OLLAMA_HOST", default_value = DEFAULT_OLLAMA_HOST)]
    ollama_host: String,

    /// Model used for answers
    #[arg(long, env = "OLLAMA_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Number of PDF chunks placed in each prompt
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Words per PDF chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the Ollama server answers and list its models.
    Status,
    /// Show which chunks of a PDF best match a query, without calling a model.
    Rank {
        /// PDF to search.
        #[arg(long)]
        pdf: PathBuf,
        /// Search query.
        #[arg(long)]
        query: String,
    },
    /// Ask a single question, optionally grounded in a PDF.
    Ask {
        /// PDF used as context.
        #[arg(long)]
        pdf: Option<PathBuf>,
        /// Question for the model.
        #[arg(long)]
        prompt: String,
    },
    /// Interactive chat on stdin.
    Chat {
        /// PDF loaded before the first question.
        #[arg(long)]
        pdf: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let options = ChatOptions {
        model: cli.model.clone(),
        top_k: cli.top_k,
        chunk_size: cli.chunk_size,
    };
    options.validate()?;
    let backend = OllamaClient::new(&cli.ollama_host)?;
    let orchestrator = ChatOrchestrator::new(backend, options);

    info!(
        version = app_version,
        host = %cli.ollama_host,
        model = %cli.model,
        started_at = %Utc::now().to_rfc3339(),
        "pdf-chat boot"
    );

    match cli.command {
        Command::Status => {
            let backend = orchestrator.backend();
            if !backend.is_available().await {
                println!("Cannot connect to Ollama server at {}", backend.host());
                println!("Make sure Ollama is running. Start it with: ollama serve");
                return Ok(());
            }

            println!("Connected to Ollama server at {}", backend.host());
            let models = backend.list_models().await?;
            if models.is_empty() {
                println!("no models installed");
            }
            for model in models {
                let marker = if model == cli.model { "*" } else { " " };
                println!("{marker} {model}");
            }
        }
        Command::Rank { pdf, query } => {
            let document = ingest_pdf_file(&pdf, cli.chunk_size)?;
            let ranked = rank_chunks(&query, &document.chunks, cli.top_k)?;

            println!(
                "query: {query} ({} chunks from {})",
                document.chunks.len(),
                document.fingerprint.title
            );
            for hit in ranked {
                println!("[{}] score={:.4}", hit.index, hit.score);
                println!("  {}", preview(&hit.text, 240));
            }
        }
        Command::Ask { pdf, prompt } => {
            let mut session = Session::new();
            if let Some(path) = pdf {
                load_into(&orchestrator, &mut session, &path)?;
            }

            let reply = orchestrator.ask(&mut session, &prompt).await?;
            if !reply.answered {
                anyhow::bail!(reply.message.content);
            }
            println!("{}", reply.message.content);
        }
        Command::Chat { pdf } => {
            let mut session = Session::new();
            if let Some(path) = pdf {
                load_into(&orchestrator, &mut session, &path)?;
            }
            run_chat(&orchestrator, &mut session).await?;
        }
    }

    Ok(())
}

fn load_into<B>(
    orchestrator: &ChatOrchestrator<B>,
    session: &mut Session,
    path: &Path,
) -> anyhow::Result<()>
where
    B: ChatBackend + Send + Sync,
{
    let document = ingest_pdf_file(path, orchestrator.options().chunk_size)?;
    let title = document.fingerprint.title.clone();
    let count = orchestrator.attach_document(session, document);
    if count == 0 {
        warn!(path = %path.display(), "pdf contains no extractable text");
    }
    println!("PDF processed and ready! ({title}, {count} chunks)");
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum ChatCommand<'a> {
    Quit,
    Clear,
    Load(&'a str),
    Save(&'a str),
    Prompt(&'a str),
}

impl<'a> ChatCommand<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let command = match (head, rest) {
            ("/quit", _) | ("/exit", _) => Self::Quit,
            ("/clear", _) => Self::Clear,
            ("/load", path) if !path.is_empty() => Self::Load(path),
            ("/save", path) if !path.is_empty() => Self::Save(path),
            _ => Self::Prompt(line),
        };
        Some(command)
    }
}

async fn save_session(session: &Session, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(session)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Returns false once the loop should stop. Errors leave the session intact.
async fn apply<B>(
    orchestrator: &ChatOrchestrator<B>,
    session: &mut Session,
    command: ChatCommand<'_>,
) -> anyhow::Result<bool>
where
    B: ChatBackend + Send + Sync,
{
    match command {
        ChatCommand::Quit => return Ok(false),
        ChatCommand::Clear => {
            orchestrator.clear(session);
            println!("history cleared");
            println!("{GREETING}");
        }
        ChatCommand::Load(path) => load_into(orchestrator, session, Path::new(path))
            .map_err(|error| anyhow::anyhow!("unable to load pdf: {error}"))?,
        ChatCommand::Save(path) => {
            save_session(session, Path::new(path))
                .await
                .map_err(|error| anyhow::anyhow!("unable to save: {error}"))?;
            println!("saved {} messages to {path}", session.messages.len());
        }
        ChatCommand::Prompt(prompt) => {
            let reply = orchestrator
                .ask(session, prompt)
                .await
                .map_err(|error| anyhow::anyhow!("request failed: {error}"))?;
            println!("assistant: {}", reply.message.content);
        }
    }
    Ok(true)
}

async fn run_chat<B>(orchestrator: &ChatOrchestrator<B>, session: &mut Session) -> anyhow::Result<()>
where
    B: ChatBackend + Send + Sync,
{
    if !orchestrator.backend().is_available().await {
        println!("Cannot connect to Ollama server. Start it with: ollama serve");
    }
    println!("commands: /load <pdf>, /clear, /save <file>, /quit");
    if session.messages.is_empty() {
        println!("{GREETING}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = ChatCommand::parse(&line) else {
            continue;
        };

        match apply(orchestrator, session, command).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(error) => {
                warn!(%error, "chat command failed");
                println!("{error}");
            }
        }
    }

    Ok(())
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut shortened = text.chars().take(max_chars).collect::<String>();
    if text.chars().count() > max_chars {
        shortened.push_str("...");
    }
    shortened
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn offline_orchestrator() -> ChatOrchestrator<OllamaClient> {
        let backend = OllamaClient::new("http://127.0.0.1:9").expect("static url");
        ChatOrchestrator::new(backend, ChatOptions::default())
    }

    #[test]
    fn commands_are_parsed() {
        assert_eq!(ChatCommand::parse("/quit"), Some(ChatCommand::Quit));
        assert_eq!(ChatCommand::parse("  /exit "), Some(ChatCommand::Quit));
        assert_eq!(ChatCommand::parse("/clear"), Some(ChatCommand::Clear));
        assert_eq!(
            ChatCommand::parse("/load  manuals/pump.pdf "),
            Some(ChatCommand::Load("manuals/pump.pdf"))
        );
        assert_eq!(
            ChatCommand::parse("/save chat.json"),
            Some(ChatCommand::Save("chat.json"))
        );
        assert_eq!(
            ChatCommand::parse("what is the max pressure?"),
            Some(ChatCommand::Prompt("what is the max pressure?"))
        );
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(ChatCommand::parse(""), None);
        assert_eq!(ChatCommand::parse("   \t"), None);
    }

    #[test]
    fn commands_without_a_path_are_prompts() {
        assert_eq!(ChatCommand::parse("/load"), Some(ChatCommand::Prompt("/load")));
        assert_eq!(ChatCommand::parse("/save  "), Some(ChatCommand::Prompt("/save")));
    }

    #[tokio::test]
    async fn save_writes_the_transcript() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("chat.json");
        let orchestrator = offline_orchestrator();
        let mut session = Session::new();
        session
            .messages
            .push(pdf_chat_core::ChatMessage::user("hello"));

        let path_text = path.to_str().expect("utf-8 temp path");
        let keep_going = apply(&orchestrator, &mut session, ChatCommand::Save(path_text))
            .await
            .expect("save should succeed");
        assert!(keep_going);

        let restored: Session = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(restored, session);
        Ok(())
    }

    #[tokio::test]
    async fn failed_save_keeps_the_conversation() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("missing").join("chat.json");
        let orchestrator = offline_orchestrator();
        let mut session = Session::new();
        session
            .messages
            .push(pdf_chat_core::ChatMessage::user("hello"));

        let path_text = path.to_str().expect("utf-8 temp path");
        let error = apply(&orchestrator, &mut session, ChatCommand::Save(path_text))
            .await
            .expect_err("missing directory should fail");

        assert!(error.to_string().starts_with("unable to save:"));
        assert_eq!(session.messages.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn failed_load_keeps_the_conversation() {
        let orchestrator = offline_orchestrator();
        let mut session = Session::new();
        session
            .messages
            .push(pdf_chat_core::ChatMessage::user("hello"));

        let error = apply(&orchestrator, &mut session, ChatCommand::Load("/no/such/file.pdf"))
            .await
            .expect_err("missing pdf should fail");

        assert!(error.to_string().starts_with("unable to load pdf:"));
        assert_eq!(session.messages.len(), 1);
    }

    #[tokio::test]
    async fn quit_stops_and_clear_empties() {
        let orchestrator = offline_orchestrator();
        let mut session = Session::new();
        session
            .messages
            .push(pdf_chat_core::ChatMessage::user("hello"));

        assert!(!apply(&orchestrator, &mut session, ChatCommand::Quit)
            .await
            .expect("quit"));
        assert!(apply(&orchestrator, &mut session, ChatCommand::Clear)
            .await
            .expect("clear"));
        assert!(session.messages.is_empty());
    }
}
