use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jeonghuni_bot::{
    ActivationPolicy, ApiServerBuilder, BotIdentity, Config, ContextStore,
    OpenAiCompletionClient, Responder, TelegramChannel,
};

/// Jeonghuni - conversational Telegram bot
#[derive(Parser)]
#[command(name = "jeonghuni", version, about)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, env = "JEONGHUNI_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the webhook server (default)
    Serve,
    /// Register the webhook URL with Telegram
    SetWebhook {
        /// Public URL Telegram should post updates to (defaults to config)
        url: Option<String>,
    },
    /// Remove the registered webhook
    DeleteWebhook,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,jeonghuni_bot=info",
        1 => "info,jeonghuni_bot=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::SetWebhook { url } => {
            let url = url
                .or_else(|| config.telegram.webhook_url.clone())
                .ok_or_else(|| anyhow::anyhow!("no webhook URL given or configured"))?;
            let channel = TelegramChannel::from_config(&config.telegram);
            channel
                .set_webhook(&url, config.telegram.webhook_secret.as_deref())
                .await?;
            println!("Webhook set to {url}");
            Ok(())
        }
        Command::DeleteWebhook => {
            let channel = TelegramChannel::from_config(&config.telegram);
            channel.delete_webhook().await?;
            println!("Webhook removed");
            Ok(())
        }
    }
}

/// Run the webhook server until interrupted
async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        port = config.port,
        model = %config.llm.model,
        max_turns = config.context.max_turns,
        "starting jeonghuni"
    );

    let channel = Arc::new(TelegramChannel::from_config(&config.telegram));
    let bot = resolve_identity(&channel, config.telegram.bot_username.as_deref()).await?;
    tracing::info!(username = %bot.username, id = ?bot.id, "bot identity resolved");

    let store = Arc::new(ContextStore::new(
        config.context.max_turns,
        config.context.max_chats,
    ));
    let completion = Arc::new(OpenAiCompletionClient::new(&config.llm)?);
    let responder = Responder::new(
        store,
        Arc::new(config.prompts),
        completion,
        config.replies.empty_completion.clone(),
    );
    let policy = ActivationPolicy::new(bot, config.telegram.keyword);

    if let Some(url) = config.telegram.webhook_url.as_deref()
        && let Err(e) = channel
            .set_webhook(url, config.telegram.webhook_secret.as_deref())
            .await
    {
        tracing::warn!(url, error = %e, "failed to register Telegram webhook");
    }

    let server = ApiServerBuilder::new(channel, policy, responder, config.port)
        .replies(config.replies)
        .webhook_secret(config.telegram.webhook_secret)
        .build();

    tracing::info!("jeonghuni ready");
    server.run().await?;

    Ok(())
}

/// Ask Telegram who we are, falling back to the configured username
async fn resolve_identity(
    channel: &TelegramChannel,
    configured: Option<&str>,
) -> anyhow::Result<BotIdentity> {
    match channel.get_me().await {
        Ok(me) => {
            let username = me
                .username
                .or_else(|| configured.map(ToString::to_string))
                .ok_or_else(|| anyhow::anyhow!("bot has no username"))?;
            if let Some(configured) = configured
                && configured != username
            {
                tracing::warn!(
                    configured,
                    actual = %username,
                    "configured bot username differs from getMe"
                );
            }
            Ok(BotIdentity {
                id: Some(me.id),
                username,
            })
        }
        Err(e) => {
            let username = configured.ok_or_else(|| {
                anyhow::anyhow!("getMe failed ({e}) and no bot username is configured")
            })?;
            tracing::warn!(error = %e, "getMe failed, using configured bot username");
            Ok(BotIdentity::from_username(username))
        }
    }
}
