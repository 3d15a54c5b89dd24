//! Command-line interface: `botwire chat` and `botwire orchestrate`.

use crate::config::Config;
use crate::directline::{self, ChatSession};
use crate::orchestration::OrchestrationClient;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Console clients for DirectLine bots and orchestration projects
#[derive(Parser, Debug)]
#[command(name = "botwire", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: <config dir>/botwire/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chat with a bot over DirectLine
    Chat(ChatArgs),
    /// Send queries to an orchestration project
    Orchestrate(OrchestrateArgs),
}

#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Send one message after the greeting and exit
    #[arg(short, long)]
    pub message: Option<String>,

    /// Activity fetches per message
    #[arg(long)]
    pub poll_attempts: Option<u32>,

    /// Delay between activity fetches in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// User id to chat as (default: generated dl_<uuid>)
    #[arg(long)]
    pub user_id: Option<String>,
}

#[derive(Parser, Debug)]
pub struct OrchestrateArgs {
    /// Run a single query and exit
    #[arg(short, long)]
    pub query: Option<String>,
}

/// Run the selected subcommand.
pub async fn run(cli: Cli) -> ExitCode {
    init_tracing(cli.verbose);

    match run_inner(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Debug logs with `--verbose` or `BOTWIRE_LOG`, `RUST_LOG` if set, warnings otherwise.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose || std::env::var("BOTWIRE_LOG").is_ok() {
        EnvFilter::new("botwire=debug")
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new("botwire=warn")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run_inner(cli: Cli) -> Result<()> {
    let path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_with(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    match cli.command {
        Commands::Chat(args) => chat(config, args).await,
        Commands::Orchestrate(args) => orchestrate(config, args).await,
    }
}

async fn chat(mut config: Config, args: ChatArgs) -> Result<()> {
    if let Some(attempts) = args.poll_attempts {
        config.directline.poll_attempts = attempts;
    }
    if let Some(interval) = args.poll_interval_ms {
        config.directline.poll_interval_ms = interval;
    }
    config.validate_directline()?;

    let mut session = ChatSession::new(&config.directline, config.request_timeout())?;
    if let Some(user_id) = args.user_id {
        session = session.with_user_id(user_id);
    }

    match session.start().await {
        Ok(conversation) => tracing::debug!(conversation_id = %conversation.id, "chat started"),
        Err(e @ directline::Error::Conversation { .. }) => {
            return Err(anyhow::Error::new(e).context("Failed to open new conversation"));
        }
        Err(e) => return Err(e.into()),
    }

    // An empty first message prompts the bot's greeting
    print!("{}", session.run_interaction("").await?);

    if let Some(message) = args.message {
        print!("{}", session.run_interaction(&message).await?);
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(text) = prompt(&mut lines, "Enter your message to the bot (or 'quit' to exit): ").await? {
        if is_quit(&text) {
            break;
        }
        print!("{}", session.run_interaction(&text).await?);
    }
    Ok(())
}

async fn orchestrate(config: Config, args: OrchestrateArgs) -> Result<()> {
    config.validate_orchestration()?;
    let client = OrchestrationClient::new(&config.orchestration, config.request_timeout())?;

    if let Some(query) = args.query {
        print!("{}", client.analyze(&query).await?);
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(query) = prompt(
        &mut lines,
        "Input a query to your orchestration project (or 'quit' to exit): ",
    )
    .await?
    {
        if is_quit(&query) {
            break;
        }
        print!("{}", client.analyze(&query).await?);
    }
    Ok(())
}

/// Print `label` and read one line. `None` once stdin is closed.
async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    let line = lines.next_line().await.context("Failed to read stdin")?;
    Ok(line.map(|l| l.trim().to_string()))
}

fn is_quit(input: &str) -> bool {
    input.eq_ignore_ascii_case("quit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_args() {
        let cli = Cli::parse_from([
            "botwire",
            "chat",
            "--poll-attempts",
            "3",
            "--message",
            "hello",
            "-v",
        ]);
        assert!(cli.verbose);
        let Commands::Chat(args) = cli.command else {
            panic!("expected chat");
        };
        assert_eq!(args.poll_attempts, Some(3));
        assert_eq!(args.message.as_deref(), Some("hello"));
        assert!(args.user_id.is_none());
    }

    #[test]
    fn test_parse_orchestrate_args() {
        let cli = Cli::parse_from([
            "botwire",
            "--config",
            "/tmp/botwire.toml",
            "orchestrate",
            "-q",
            "What time is it?",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/botwire.toml")));
        let Commands::Orchestrate(args) = cli.command else {
            panic!("expected orchestrate");
        };
        assert_eq!(args.query.as_deref(), Some("What time is it?"));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["botwire"]).is_err());
    }

    #[test]
    fn test_is_quit() {
        assert!(is_quit("quit"));
        assert!(is_quit("QUIT"));
        assert!(!is_quit("quit now"));
        assert!(!is_quit(""));
    }
}
