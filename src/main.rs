//! OneiroMind terminal client
//!
//! Logs in, opens a chat page and runs the session in a line-oriented REPL:
//! - `oneiromind chat` starts a new dream
//! - `oneiromind chat --session 42` continues an existing session
//! - `oneiromind config` prints a default config file

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oneiromind::chat::{ChatSession, Outcome, SessionId, Submission, SESSION_ENDED_PROMPT};
use oneiromind::config::{generate_default_config, Config};
use oneiromind::login::{LoginCheck, LoginForm};
use oneiromind::page::parse_chat_page;
use oneiromind::terminal::{prompt, TerminalRenderer};
use oneiromind::transport::{paths, HttpTransport};

#[derive(Parser)]
#[command(name = "oneiromind")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dream interpretation chat in the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/oneiromind/config.toml, then ./config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Server URL, overriding the config file
    #[arg(long, global = true)]
    pub server: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chat with the dream interpreter
    Chat {
        /// Continue an existing session instead of starting a new dream
        #[arg(short, long)]
        session: Option<i64>,
        /// Account email (prompted if omitted)
        #[arg(long)]
        email: Option<String>,
        /// Account password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Generate a default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

type StdinLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {:?}", path))?,
        None => Config::load_default(),
    };
    if let Some(server) = cli.server {
        config.server.base_url = server;
    }

    init_logging(&config);

    match cli.command {
        Commands::Chat {
            session,
            email,
            password,
        } => {
            let mut stdin = BufReader::new(tokio::io::stdin()).lines();
            let email = match email {
                Some(email) => email,
                None => ask(&mut stdin, "Email: ").await?,
            };
            let password = match password {
                Some(password) => password,
                None => ask(&mut stdin, "Password: ").await?,
            };

            let credentials = match LoginForm::new().on_submit(&email, &password) {
                LoginCheck::Allow(credentials) => credentials,
                LoginCheck::Prevent(e) => bail!("{}", e),
            };

            let transport = HttpTransport::new(config.server.transport_config())
                .context("creating HTTP client")?;
            transport
                .login(&credentials)
                .await
                .with_context(|| format!("logging in to {}", transport.config().base_url))?;

            run_chat(&transport, session.map(SessionId), &mut stdin).await?;
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("oneiromind={}", config.logging.level).into());

    // Logs go to stderr so they do not interleave with the conversation
    let json = config.logging.format == "json";
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

async fn ask(stdin: &mut StdinLines, label: &str) -> anyhow::Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    Ok(stdin.next_line().await?.unwrap_or_default())
}

fn print_new(renderer: &mut TerminalRenderer, session: &ChatSession) {
    for line in renderer.render(session.log()) {
        println!("{}", line);
    }
}

/// Run the REPL until the session ends, stdin closes, or `/quit`
async fn run_chat(
    transport: &HttpTransport,
    start: Option<SessionId>,
    stdin: &mut StdinLines,
) -> anyhow::Result<()> {
    let mut path = start
        .map(|id| id.chat_path())
        .unwrap_or_else(|| paths::HOME.to_string());
    let mut renderer = TerminalRenderer::new();

    'page: loop {
        let html = transport
            .load_page(&path)
            .await
            .with_context(|| format!("loading {}", path))?;
        let seed = parse_chat_page(&html).with_context(|| format!("reading {}", path))?;
        let mut session = ChatSession::restore(seed);

        renderer.reset();
        print_new(&mut renderer, &session);

        loop {
            if session.phase().is_terminal() {
                println!("{}", SESSION_ENDED_PROMPT);
                return Ok(());
            }

            print!("{}", prompt(session.controls()));
            std::io::stdout().flush()?;

            let Some(line) = stdin.next_line().await? else {
                println!();
                return Ok(());
            };
            if line.trim() == "/quit" {
                return Ok(());
            }

            match session.submit(&line) {
                Submission::Ignored => continue,
                Submission::Local => print_new(&mut renderer, &session),
                Submission::Request(pending) => {
                    print_new(&mut renderer, &session);
                    let reply = pending.send(transport).await;
                    let outcome = session.resolve(pending, reply);
                    print_new(&mut renderer, &session);

                    if let Outcome::Navigate(id) = outcome {
                        path = id.chat_path();
                        continue 'page;
                    }
                }
            }
        }
    }
}
