use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing_subscriber::EnvFilter;

use millionisho_bot::access::AccessPolicy;
use millionisho_bot::ai::llm::LlmClient;
use millionisho_bot::bot::{self, commands::BotCommand, AppState};
use millionisho_bot::config::AppConfig;
use millionisho_bot::content::ContentStore;
use millionisho_bot::conversation::Conversation;
use millionisho_bot::db::Database;
use millionisho_bot::licensing::LicenseClient;
use millionisho_bot::menu;
use millionisho_bot::users::{MemoryUserRepository, UserRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🤖 Starting Millionisho bot...");

    // Load config
    let config = AppConfig::from_env()?;
    tracing::info!(
        model = %config.openai_model,
        admins = config.admin_ids.len(),
        "Config loaded"
    );

    // Load content
    let sections = menu::CONTENT_SECTIONS.iter().map(|s| s.to_string()).collect();
    let content = Arc::new(ContentStore::new(config.content_dir.clone(), sections));
    let report = content.load().await;
    for (section, count) in &report.counts {
        tracing::info!(section = %section, count, "Section loaded");
    }
    for error in &report.errors {
        tracing::error!(
            section = %error.section,
            path = %error.path.display(),
            "Section is read-only: {}",
            error.message
        );
    }

    // User state: Postgres when configured, memory otherwise
    let users: Arc<dyn UserRepository> = match &config.database_url {
        Some(url) => {
            let db = Database::connect(url).await?;
            db.run_migrations().await?;
            tracing::info!("Database connected and migrations applied.");
            Arc::new(db)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; user state will not survive a restart");
            Arc::new(MemoryUserRepository::new())
        }
    };

    // External clients
    let licenses = Arc::new(LicenseClient::new(&config)?);
    let generator = Arc::new(LlmClient::new(&config)?);

    let conversation = Conversation::new(
        content,
        users,
        AccessPolicy::with_free_limit(config.free_limit),
        licenses,
        generator,
        config.admin_ids.iter().copied(),
    );
    let state = Arc::new(AppState { conversation });

    // Create the Telegram bot
    let bot = match &config.proxy_url {
        Some(proxy) => Bot::with_client(&config.telegram_bot_token, telegram_client(proxy)?),
        None => Bot::new(&config.telegram_bot_token),
    };

    if let Err(e) = bot.set_my_commands(BotCommand::bot_commands()).await {
        tracing::warn!("Failed to register the command list: {}", e);
    }

    // Build the dispatcher
    let handler = bot::build_handler();

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// teloxide's default client settings routed through `proxy`.
fn telegram_client(proxy: &str) -> anyhow::Result<reqwest011::Client> {
    let client = teloxide::net::default_reqwest_settings()
        .proxy(reqwest011::Proxy::all(proxy)?)
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_client_builds_for_telegram() {
        let client = telegram_client("http://127.0.0.1:3128").unwrap();
        let _bot = Bot::with_client("123:abc", client);
    }

    #[test]
    fn malformed_proxy_is_an_error() {
        assert!(telegram_client("http://[not a proxy").is_err());
    }
}
