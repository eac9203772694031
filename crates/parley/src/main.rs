//! parley CLI - chat with an OpenAI-compatible provider from the terminal.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use parley::config::{Config, DEFAULT_CONFIG_FILE};
use parley::llm::CompletionClient;
use parley::provider::ProviderRegistry;
use parley::session::{ChatSession, Selection};

#[derive(Parser)]
#[command(name = "parley")]
#[command(version)]
#[command(about = "Chat with OpenAI-compatible providers configured as JSON files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory of provider JSON files (overrides the config file)
    #[arg(long, global = true)]
    providers_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured providers and their models
    Providers,

    /// Send a single message and print the reply
    Ask {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Message to send
        message: String,
    },

    /// Start an interactive chat session on stdin
    Chat {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Save the transcript to this file when the session ends
        #[arg(short, long)]
        transcript: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SelectionArgs {
    /// Provider name (defaults to the first configured provider)
    #[arg(short, long)]
    provider: Option<String>,

    /// Model name (defaults to the provider's first model)
    #[arg(short, long)]
    model: Option<String>,

    /// System prompt (defaults to the configured prompt)
    #[arg(long)]
    prompt: Option<String>,
}

impl SelectionArgs {
    /// Fill unset choices the way cascading dropdowns would: first provider,
    /// then that provider's first model.
    fn into_selection(self, registry: &ProviderRegistry, default_prompt: &str) -> Selection {
        let provider = self
            .provider
            .or_else(|| registry.names().first().map(|n| n.to_string()));
        let model = self.model.or_else(|| {
            provider
                .as_deref()
                .and_then(|p| registry.models(p))
                .and_then(|models| models.first().cloned())
        });
        Selection {
            provider,
            model,
            prompt: Some(self.prompt.unwrap_or_else(|| default_prompt.to_string())),
        }
    }
}

/// One line of interactive input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Message(String),
    Save(Option<PathBuf>),
    Quit,
}

fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some(("/save", path)) if !path.trim().is_empty() => {
            Input::Save(Some(PathBuf::from(path.trim())))
        }
        _ => match trimmed {
            "/save" => Input::Save(None),
            "/quit" | "/exit" => Input::Quit,
            _ => Input::Message(line.to_string()),
        },
    }
}

/// One-shot messages must have content; there is nothing to print otherwise.
fn require_message(message: &str) -> Result<&str> {
    let message = message.trim();
    ensure!(!message.is_empty(), "Nothing to send: the message is empty");
    Ok(message)
}

fn default_transcript_path() -> PathBuf {
    PathBuf::from(
        chrono::Local::now()
            .format("transcript-%Y%m%d-%H%M%S.txt")
            .to_string(),
    )
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn print_providers(registry: &ProviderRegistry) {
    if registry.is_empty() {
        println!("No providers configured.");
        return;
    }
    for provider in registry.iter() {
        println!("{}", provider.name);
        for model in &provider.models {
            println!("  {model}");
        }
    }
}

async fn run_chat(
    mut session: ChatSession,
    client: &CompletionClient,
    transcript: Option<PathBuf>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!(
        "Chatting with {} ({}). Type /save [path] to save, /quit to exit.",
        session.provider().name,
        session.model()
    );

    loop {
        print!("You: ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            println!();
            break;
        };

        match parse_input(&line) {
            Input::Quit => break,
            Input::Save(path) => {
                let path = path.unwrap_or_else(default_transcript_path);
                match session.export(&path).await {
                    Ok(()) => println!("Transcript saved to {}", path.display()),
                    Err(e) => eprintln!("{e}"),
                }
            }
            Input::Message(text) => {
                if let Some(reply) = session.send(client, &text).await {
                    println!("AI: {reply}");
                }
            }
        }
    }

    if let Some(path) = transcript {
        session
            .export(&path)
            .await
            .with_context(|| format!("Failed to save transcript to {:?}", path))?;
        println!("Transcript saved to {}", path.display());
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = Config::load(&cli.config)
        .await
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    let providers_dir = cli
        .providers_dir
        .unwrap_or_else(|| config.providers_dir.clone());
    let registry = ProviderRegistry::load(&providers_dir, &config.reserved_file)
        .context("Failed to load providers")?;

    let client = CompletionClient::default();

    match cli.command {
        Commands::Providers => print_providers(&registry),

        Commands::Ask { selection, message } => {
            let message = require_message(&message)?;
            let mut session = selection
                .into_selection(&registry, &config.default_prompt)
                .start(&registry)
                .context("Cannot start chat session")?;
            if let Some(reply) = session.send(&client, message).await {
                println!("{reply}");
            }
        }

        Commands::Chat {
            selection,
            transcript,
        } => {
            let session = selection
                .into_selection(&registry, &config.default_prompt)
                .start(&registry)
                .context("Cannot start chat session")?;
            run_chat(session, &client, transcript).await?;
            info!("Chat session ended");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley::provider::ProviderRecord;

    fn registry() -> ProviderRegistry {
        ProviderRegistry::new(vec![
            ProviderRecord {
                name: "first".to_string(),
                api_key: "k1".to_string(),
                base_url: "http://first".to_string(),
                models: vec!["f-1".to_string(), "f-2".to_string()],
            },
            ProviderRecord {
                name: "second".to_string(),
                api_key: "k2".to_string(),
                base_url: "http://second".to_string(),
                models: vec!["s-1".to_string()],
            },
        ])
    }

    fn args(provider: Option<&str>, model: Option<&str>, prompt: Option<&str>) -> SelectionArgs {
        SelectionArgs {
            provider: provider.map(String::from),
            model: model.map(String::from),
            prompt: prompt.map(String::from),
        }
    }

    #[test]
    fn parse_input_commands() {
        assert_eq!(parse_input("/quit"), Input::Quit);
        assert_eq!(parse_input("  /exit "), Input::Quit);
        assert_eq!(parse_input("/save"), Input::Save(None));
        assert_eq!(
            parse_input("/save notes/chat.txt"),
            Input::Save(Some(PathBuf::from("notes/chat.txt")))
        );
        assert_eq!(
            parse_input("hello /save"),
            Input::Message("hello /save".to_string())
        );
    }

    #[test]
    fn blank_ask_message_is_rejected() {
        let err = require_message(" \n\t ").unwrap_err();
        assert!(err.to_string().contains("Nothing to send"));
        assert_eq!(require_message("  hi ").unwrap(), "hi");
    }

    #[test]
    fn selection_defaults_cascade() {
        let selection = args(None, None, None).into_selection(&registry(), "default");
        assert_eq!(selection.provider.as_deref(), Some("first"));
        assert_eq!(selection.model.as_deref(), Some("f-1"));
        assert_eq!(selection.prompt.as_deref(), Some("default"));

        let selection = args(Some("second"), None, Some("custom")).into_selection(&registry(), "d");
        assert_eq!(selection.model.as_deref(), Some("s-1"));
        assert_eq!(selection.prompt.as_deref(), Some("custom"));
    }

    #[test]
    fn selection_defaults_with_empty_registry() {
        let selection = args(None, None, None).into_selection(&ProviderRegistry::default(), "p");
        assert!(selection.provider.is_none());
        assert!(selection.model.is_none());
    }

    #[test]
    fn cli_parses_chat() {
        let cli = Cli::try_parse_from([
            "parley",
            "--providers-dir",
            "conf",
            "chat",
            "--provider",
            "first",
            "--model",
            "f-2",
            "--transcript",
            "out.txt",
        ])
        .unwrap();

        assert_eq!(cli.providers_dir, Some(PathBuf::from("conf")));
        match cli.command {
            Commands::Chat {
                selection,
                transcript,
            } => {
                assert_eq!(selection.provider.as_deref(), Some("first"));
                assert_eq!(selection.model.as_deref(), Some("f-2"));
                assert_eq!(transcript, Some(PathBuf::from("out.txt")));
            }
            _ => panic!("expected chat command"),
        }
    }
}
