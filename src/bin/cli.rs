//! Campus notice notifier CLI
//!
//! Runs one check per invocation; schedule it with cron or a CI timer.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use notifier::{
    config::{self, Secrets},
    error::{AppError, Result},
    history::{HistoryLoad, HistoryStore},
    models::{Config, RunReport},
    notify::{self, Broadcaster, DiscordNotifier, EmailNotifier, Notifier, TelegramNotifier},
    pipeline::{ChangeDetector, Pipeline},
    services::{
        BoardCrawler, ExcerptSummarizer, FileSubscriberRegistry, OpenAiSummarizer, Summarizer,
    },
    storage::LocalStorage,
    utils::{self, http},
};

/// Campus notice notifier
#[derive(Parser, Debug)]
#[command(
    name = "notifier",
    version,
    about = "Detects new campus notices and notifies subscribers"
)]
struct Cli {
    /// Path to storage directory holding config, history and subscribers
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one check; always exits 0 once the check has run
    Run,

    /// Run one check and print the report as JSON
    Test,

    /// Run one check; exits 1 when the report is an error
    Scheduler,

    /// Validate configuration
    Validate,

    /// Show storage and channel status
    Info,

    /// Send a fixed test message through one channel
    Ping {
        #[arg(value_enum)]
        channel: Channel,

        /// Recipient address (email only)
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Channel {
    Email,
    Discord,
    Telegram,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Everything one check needs, owned in one place.
struct Services {
    detector: ChangeDetector<LocalStorage>,
    crawler: BoardCrawler,
    summarizer: Box<dyn Summarizer>,
    registry: FileSubscriberRegistry,
    mailer: Option<EmailNotifier>,
    broadcasters: Vec<Box<dyn Broadcaster>>,
}

impl Services {
    fn build(storage_dir: &Path, config: &Config, secrets: &Secrets) -> Result<Self> {
        let client = http::create_async_client(&config.crawler)?;

        let history = HistoryStore::with_max_entries(
            LocalStorage::in_dir(storage_dir, &config.history.file),
            config.history.max_entries,
        );

        let summarizer: Box<dyn Summarizer> = match &secrets.openai_api_key {
            Some(key) => Box::new(OpenAiSummarizer::new(
                client.clone(),
                key.clone(),
                config.summarizer.clone(),
            )),
            None => {
                log::warn!("{} not set, summaries are plain excerpts", config::OPENAI_API_KEY);
                Box::new(ExcerptSummarizer::new(config.summarizer.max_length))
            }
        };

        let mailer = match &secrets.email {
            Some(creds) => Some(EmailNotifier::new(
                &config.email,
                &creds.user,
                &creds.password,
            )?),
            None => {
                log::warn!(
                    "{}/{} not set, email delivery is disabled",
                    config::EMAIL_USER,
                    config::EMAIL_PASSWORD
                );
                None
            }
        };

        Ok(Self {
            detector: ChangeDetector::new(history),
            crawler: BoardCrawler::with_client(client.clone(), config)?,
            summarizer,
            registry: FileSubscriberRegistry::new(storage_dir.join(&config.subscribers.file)),
            mailer,
            broadcasters: build_broadcasters(&client, config, secrets),
        })
    }

    fn pipeline(&self) -> Pipeline<'_, LocalStorage> {
        let mut pipeline = Pipeline::new(
            &self.detector,
            &self.crawler,
            self.summarizer.as_ref(),
            &self.registry,
        );
        if let Some(mailer) = &self.mailer {
            pipeline = pipeline.with_mailer(mailer);
        }
        for broadcaster in &self.broadcasters {
            pipeline = pipeline.with_broadcaster(broadcaster.as_ref());
        }
        pipeline
    }
}

/// Chat broadcasters that are enabled in config and have a token.
fn build_broadcasters(
    client: &reqwest::Client,
    config: &Config,
    secrets: &Secrets,
) -> Vec<Box<dyn Broadcaster>> {
    let mut broadcasters: Vec<Box<dyn Broadcaster>> = Vec::new();

    if config.discord.enabled {
        match &secrets.discord_token {
            Some(token) => broadcasters.push(Box::new(DiscordNotifier::new(
                client.clone(),
                token.clone(),
                &config.discord,
            ))),
            None => log::warn!("Discord enabled but {} is not set", config::DISCORD_BOT_TOKEN),
        }
    }

    if config.telegram.enabled {
        match &secrets.telegram_token {
            Some(token) => broadcasters.push(Box::new(TelegramNotifier::new(
                client.clone(),
                token.clone(),
                &config.telegram,
            ))),
            None => log::warn!(
                "Telegram enabled but {} is not set",
                config::TELEGRAM_BOT_TOKEN
            ),
        }
    }

    broadcasters
}

async fn check(storage_dir: &Path, config: &Config, secrets: &Secrets) -> RunReport {
    match Services::build(storage_dir, config, secrets) {
        Ok(services) => services.pipeline().check_and_notify().await,
        Err(e) => {
            log::error!("Setup failed: {}", e);
            RunReport::error(e.to_string())
        }
    }
}

async fn ping(config: &Config, secrets: &Secrets, channel: Channel, to: Option<String>) -> Result<()> {
    let message = notify::test_notification();
    let client = http::create_async_client(&config.crawler)?;

    match channel {
        Channel::Email => {
            let creds = secrets.email.as_ref().ok_or_else(|| {
                AppError::config(format!(
                    "{} and {} must be set",
                    config::EMAIL_USER,
                    config::EMAIL_PASSWORD
                ))
            })?;
            let to = to.unwrap_or_else(|| creds.user.clone());
            let mailer = EmailNotifier::new(&config.email, &creds.user, &creds.password)?;
            mailer.send(&message, &to).await
        }
        Channel::Discord => {
            let token = secrets.discord_token.as_ref().ok_or_else(|| {
                AppError::config(format!("{} must be set", config::DISCORD_BOT_TOKEN))
            })?;
            let discord = DiscordNotifier::new(client, token.clone(), &config.discord);
            expect_delivery("discord", discord.broadcast(&message).await.succeeded)
        }
        Channel::Telegram => {
            let token = secrets.telegram_token.as_ref().ok_or_else(|| {
                AppError::config(format!("{} must be set", config::TELEGRAM_BOT_TOKEN))
            })?;
            let telegram = TelegramNotifier::new(client, token.clone(), &config.telegram);
            match to {
                Some(chat_id) => Notifier::send(&telegram, &message, &chat_id).await,
                None => expect_delivery("telegram", telegram.broadcast(&message).await.succeeded),
            }
        }
    }
}

fn expect_delivery(channel: &str, succeeded: usize) -> Result<()> {
    if succeeded == 0 {
        return Err(AppError::notify(channel, "no message was delivered"));
    }
    Ok(())
}

async fn info(storage_dir: &Path, config: &Config, secrets: &Secrets) {
    log::info!("Storage directory: {}", storage_dir.display());

    let history = HistoryStore::new(LocalStorage::in_dir(storage_dir, &config.history.file));
    match history.load_record().await {
        HistoryLoad::Loaded(record) => {
            log::info!("History: {} notices", record.notices.len());
            if let Some(updated) = &record.last_updated {
                utils::log::sub_item(&format!("last updated {updated}"));
            }
            if let Some(latest) = record.notices.first() {
                utils::log::sub_item(&format!("latest: {}", latest.title));
            }
        }
        HistoryLoad::Missing => log::info!("History: none yet (next run records a baseline)"),
        HistoryLoad::Unreadable(reason) => log::warn!("History: unreadable ({reason})"),
    }

    let registry = FileSubscriberRegistry::new(storage_dir.join(&config.subscribers.file));
    match registry.load_all().await {
        Ok(all) => log::info!(
            "Subscribers: {} active of {}",
            all.iter().filter(|s| s.active).count(),
            all.len()
        ),
        Err(e) => log::warn!("Subscribers: unreadable ({e})"),
    }

    let on_off = |on: bool| if on { "on" } else { "off" };
    log::info!("Channels:");
    utils::log::sub_item(&format!("email: {}", on_off(secrets.email.is_some())));
    utils::log::sub_item(&format!(
        "discord: {}",
        on_off(config.discord.enabled && secrets.discord_token.is_some())
    ));
    utils::log::sub_item(&format!(
        "telegram: {}",
        on_off(config.telegram.enabled && secrets.telegram_token.is_some())
    ));
    utils::log::sub_item(&format!(
        "summaries: {}",
        if secrets.openai_api_key.is_some() {
            "openai"
        } else {
            "excerpt"
        }
    ));
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    // .env is optional; real environment variables win.
    let _ = dotenvy::dotenv();
    init_logging(cli.verbose);

    let secrets = Secrets::from_env();
    let config = match config::load_config(&cli.storage_dir, &secrets) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let report = check(&cli.storage_dir, &config, &secrets).await;
            log::info!("Run finished: {}", report.message);
            ExitCode::SUCCESS
        }

        Command::Test => {
            let report = check(&cli.storage_dir, &config, &secrets).await;
            match serde_json::to_string_pretty(&report) {
                Ok(json) => {
                    println!("{json}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    log::error!("Could not serialise report: {}", e);
                    ExitCode::FAILURE
                }
            }
        }

        Command::Scheduler => {
            let report = check(&cli.storage_dir, &config, &secrets).await;
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                log::error!("Scheduled run failed: {}", report.message);
                ExitCode::FAILURE
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return ExitCode::FAILURE;
            }
            log::info!("✓ Config OK");
            ExitCode::SUCCESS
        }

        Command::Info => {
            info(&cli.storage_dir, &config, &secrets).await;
            ExitCode::SUCCESS
        }

        Command::Ping { channel, to } => match ping(&config, &secrets, channel, to).await {
            Ok(()) => {
                log::info!("✓ Test message sent via {:?}", channel);
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Test message failed: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}
