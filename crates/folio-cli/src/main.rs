use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use folio_core::config::SessionConfig;
use folio_core::pagination::Paginator;
use folio_core::session::{ACCEPTED_MIME, SessionController};
use folio_interaction::{GeminiCompletion, GeminiFileStore, config as folio_config};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

mod render;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio - chat with a document, with page-linked citations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat session over a document
    Chat {
        /// Path to the PDF document
        file: PathBuf,

        /// Completion model override
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Chat { file, model } => chat(file, model).await,
    }
}

async fn chat(path: PathBuf, model: Option<String>) -> Result<()> {
    let mut config = SessionConfig::default();
    if let Some(tuning) = folio_config::load_tuning_config().map_err(|e| anyhow!(e))? {
        config = tuning.apply(config);
    }
    if let Some(model) = model {
        config = config.with_model(model);
    }

    let display_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document.pdf")
        .to_string();
    if !display_name.to_ascii_lowercase().ends_with(".pdf") {
        bail!("only PDF documents are supported: {display_name}");
    }
    let bytes =
        std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;

    let storage = GeminiFileStore::try_from_env().map_err(|e| anyhow!(e))?;
    let completion = GeminiCompletion::try_from_env()
        .map_err(|e| anyhow!(e))?
        .with_model(config.model.clone());
    let session = SessionController::new(Arc::new(storage), Arc::new(completion), config);

    // Presentation-only welcome; never part of the transcript.
    println!(
        "Hello! I'm ready to help you analyze \"{display_name}\". Ask about its \
         content, request summaries, or look for specific information; replies \
         cite pages like [Page 3]."
    );
    println!("Uploading {display_name} ...");

    let mut pager = Paginator::new(0);
    let mut rendered = 0;
    session
        .submit_file(bytes, &display_name, ACCEPTED_MIME)
        .await?;
    rendered = render_new_messages(&session, rendered, &mut pager).await;

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();

        match input {
            "" => continue,
            ":quit" | ":q" => break,
            ":pages" => {
                render::render_viewer(&pager);
            }
            _ if input.starts_with(":page ") => {
                match input[":page ".len()..].trim().parse::<u32>() {
                    Ok(n) => {
                        pager.set_page(n);
                        render::render_viewer(&pager);
                    }
                    Err(_) => render::warn("usage: :page <number>"),
                }
            }
            _ if input.starts_with(":cite ") => {
                jump_to_cited_page(&session, &mut pager, &input[":cite ".len()..]).await;
            }
            _ if input.starts_with(':') => {
                render::warn("commands: :page <n>, :cite <n>, :pages, :quit");
            }
            _ => {
                if let Err(err) = session.submit_message(input).await {
                    render::warn(&err.to_string());
                }
                rendered = render_new_messages(&session, rendered, &mut pager).await;
            }
        }
    }

    Ok(())
}

/// Renders any messages appended since the last call; returns the new
/// rendered count.
async fn render_new_messages(
    session: &SessionController,
    rendered: usize,
    pager: &mut Paginator,
) -> usize {
    let messages = session.messages().await;
    for message in &messages[rendered..] {
        render::render_message(message, pager);
    }
    messages.len()
}

/// Resolves a 1-based citation index from the last reply and moves the
/// viewer to the cited page.
async fn jump_to_cited_page(session: &SessionController, pager: &mut Paginator, arg: &str) {
    let Ok(index) = arg.trim().parse::<usize>() else {
        render::warn("usage: :cite <number>");
        return;
    };

    let messages = session.messages().await;
    let citations = messages
        .iter()
        .rev()
        .find(|m| m.role == folio_core::session::Role::Model)
        .map(|m| m.citations())
        .unwrap_or_default();

    match index.checked_sub(1).and_then(|i| citations.get(i)) {
        Some(citation) => {
            pager.jump_to_citation(citation);
            render::render_viewer(pager);
        }
        None => render::warn(&format!(
            "the last reply has {} citation(s)",
            citations.len()
        )),
    }
}
