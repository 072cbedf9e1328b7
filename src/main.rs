use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::task::JoinSet;

use pope_bot::application::commands::{build_dispatcher, PopeServices};
use pope_bot::application::messaging::CommandDispatcher;
use pope_bot::application::services::{RosterService, RosterStore};
use pope_bot::domain::traits::Bot;
use pope_bot::infrastructure::adapters::{ConsoleAdapter, SlackAdapter};
use pope_bot::infrastructure::config::{Config, ConsoleConfig};
use pope_bot::infrastructure::storage::JsonFileStore;

#[derive(Parser)]
#[command(name = "pope-bot")]
#[command(about = "Keeps the pope queue and relays messages to the current pope", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Slack bot token (overrides config)
    #[arg(short, long)]
    token: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run_bot(&cli.config, cli.token, cli.verbose),
        Commands::Version => {
            println!("pope-bot v{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Commands::InitConfig => init_config(),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}

fn run_bot(config_path: &str, token_override: Option<String>, verbose: bool) -> ExitCode {
    let mut config = match Config::resolve(config_path) {
        Ok(config) => config,
        Err(e) => {
            init_logging(verbose);
            tracing::error!("Failed to load config {}: {}", config_path, e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(token) = token_override {
        config.set_slack_token(token);
    }

    init_logging(verbose || config.logging.verbose);
    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration in {}: {}", config_path, e);
        return ExitCode::FAILURE;
    }

    tracing::info!("Starting {}", config.bot.name);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    rt.block_on(serve(config))
}

async fn serve(config: Config) -> ExitCode {
    let store = JsonFileStore::new(&config.storage.directory);
    if let Err(e) = store.init().await {
        tracing::error!("Failed to prepare {}: {}", store.base_path().display(), e);
        return ExitCode::FAILURE;
    }
    tracing::info!("Roster stored under {}", store.base_path().display());

    let roster = Arc::new(RosterService::new(RosterStore::new(
        Arc::new(store),
        config.storage.roster_key.clone(),
    )));
    let announce = config.announce.channel.clone();
    let console_config = config.adapters.console.clone().unwrap_or_else(|| ConsoleConfig {
        enabled: false,
        user_id: "U0CONSOLE".to_string(),
        users: Vec::new(),
    });
    let console = Arc::new(
        ConsoleAdapter::new(&console_config, &config.bot.name).with_announce_channel(announce.clone()),
    );

    if let Some(token) = config.slack_token() {
        let slack = match config
            .adapters
            .slack
            .as_ref()
            .map(|slack_config| SlackAdapter::new(slack_config, token))
        {
            Some(Ok(slack)) => Arc::new(slack.with_announce_channel(announce.clone())),
            Some(Err(e)) => {
                tracing::error!("Failed to create Slack adapter: {}", e);
                return ExitCode::FAILURE;
            }
            None => return ExitCode::FAILURE,
        };
        tracing::info!("Slack adapter enabled; reading commands from stdin");
        run(slack, roster, announce.is_some(), &console).await
    } else {
        run(console.clone(), roster, announce.is_some(), &console).await
    }
}

async fn run<B: Bot + 'static>(
    bot: Arc<B>,
    roster: Arc<RosterService>,
    announce: bool,
    source: &ConsoleAdapter,
) -> ExitCode {
    // Losing the platform at startup is the one fatal error
    if let Err(e) = bot.start().await {
        tracing::error!("Could not connect to the chat platform: {}", e);
        return ExitCode::FAILURE;
    }
    let info = bot.bot_info();
    tracing::info!("Bot started: {} ({})", info.name, info.id);

    let services = PopeServices {
        roster,
        notifier: bot.clone(),
        directory: bot,
        announce,
    };
    let dispatcher = match build_dispatcher(services) {
        Ok(dispatcher) => Arc::new(dispatcher),
        Err(e) => {
            tracing::error!("Failed to register commands: {}", e);
            return ExitCode::FAILURE;
        }
    };

    event_loop(dispatcher, source).await;
    ExitCode::SUCCESS
}

async fn event_loop(dispatcher: Arc<CommandDispatcher>, source: &ConsoleAdapter) {
    let mut in_flight = JoinSet::new();
    loop {
        tokio::select! {
            message = source.next_message() => {
                let Some(message) = message else {
                    tracing::info!("Input closed, shutting down");
                    break;
                };
                let dispatcher = dispatcher.clone();
                in_flight.spawn(async move {
                    let outcome = dispatcher.dispatch(message).await;
                    tracing::debug!("Dispatch finished: {:?}", outcome);
                });
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
        }
    }

    // Let commands that are already running finish their writes
    while in_flight.join_next().await.is_some() {}
}

fn init_config() -> ExitCode {
    match Config::default().to_yaml() {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to render default config: {}", e);
            ExitCode::FAILURE
        }
    }
}
