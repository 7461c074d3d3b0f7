//! chatstream - Terminal chat client
//!
//! Loads a conversation from a streaming chat backend and keeps it rendered
//! while new prompts are answered.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use chatstream::bootstrap::{self, SessionArgs};
use chatstream::{ChatClient, ChatSession, TerminalView};
use chatstream_core::{ClientConfig, HeadlessView, MessageNode};
use clap::{Parser, Subcommand};
use pulldown_cmark_escape::escape_html;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "chatstream")]
#[command(about = "Chat with a streaming backend from the terminal")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $CHATSTREAM_CONFIG, then the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new session and print its chat page URL
    Start {
        #[arg(short, long)]
        username: String,
    },
    /// Load the conversation, then read prompts from stdin (`/quit` to leave)
    Chat {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Submit a single prompt and print the streamed reply
    Send {
        #[command(flatten)]
        session: SessionArgs,

        /// Print the rendered HTML of every message instead of streaming text
        #[arg(long)]
        transcript: bool,

        prompt: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ClientConfig::load_from_path(path)?,
        None => ClientConfig::load()?,
    };
    if let Some(server) = cli.server {
        config.server_url = server;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    tracing::debug!("Using chat endpoint {}", config.chat_url());

    match cli.command {
        Commands::Start { username } => start(&username, &config),
        Commands::Chat { session } => chat(&session, &config).await,
        Commands::Send {
            session,
            transcript,
            prompt,
        } => send(&session, &prompt, transcript, &config).await,
    }
}

fn start(username: &str, config: &ClientConfig) -> Result<()> {
    let (identity, url) = bootstrap::start_session(username, config)?;
    println!("Session {} started for {}", identity.session_id, identity.username);
    println!("{}", url);
    Ok(())
}

async fn chat(args: &SessionArgs, config: &ClientConfig) -> Result<()> {
    let client = ChatClient::from_config(config);
    let mut session = bootstrap::open_chat(args, config, &client, TerminalView::new(io::stdout())).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let prompt = line.trim();
        if prompt == "/quit" || prompt == "/exit" {
            break;
        }
        if let Err(e) = session.submit(&client, prompt).await {
            tracing::debug!("Prompt not answered: {}", e);
        }
    }

    println!();
    Ok(())
}

async fn send(args: &SessionArgs, prompt: &str, transcript: bool, config: &ClientConfig) -> Result<()> {
    let identity = bootstrap::require_identity(args, config, &mut TerminalView::new(io::stdout()))?;
    let client = ChatClient::from_config(config);

    if transcript {
        let mut session = ChatSession::new(identity, HeadlessView::default());
        session.submit(&client, prompt).await?;
        print_transcript(&session.view().nodes)?;
    } else {
        let mut session = ChatSession::new(identity, TerminalView::new(io::stdout()));
        session.submit(&client, prompt).await?;
        println!();
    }

    Ok(())
}

fn print_transcript(nodes: &[MessageNode]) -> Result<()> {
    for node in nodes {
        let mut title = String::new();
        escape_html(&mut title, &node.title)?;
        println!("<div class=\"{}\" title=\"{}\">\n{}</div>", node.class, title, node.html);
    }
    Ok(())
}
