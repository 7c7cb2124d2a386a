use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use modbot_core::{config::Config, moderation::Moderator, ports::ModerationPort, store::StateStore};

use crate::handlers;
use crate::TelegramPlatform;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub moderator: Arc<Moderator>,
    /// Our own `@username` (without the `@`), used to skip commands meant for other bots.
    pub bot_username: Option<String>,
}

pub async fn run_polling(cfg: Arc<Config>, store: Arc<StateStore>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    let bot_username = match bot.get_me().await {
        Ok(me) => {
            tracing::info!(username = %me.username(), "modbot started");
            Some(me.username().to_string())
        }
        Err(e) => {
            tracing::warn!(error = %e, "get_me failed; commands addressed to a bot name will be ignored");
            None
        }
    };
    tracing::info!(
        admins = cfg.admins.len(),
        data_file = %store.path().display(),
        "configuration loaded"
    );

    let platform: Arc<dyn ModerationPort> = Arc::new(TelegramPlatform::new(bot.clone()));
    let moderator = Moderator::new(store, cfg.admins.clone(), platform)
        .with_message_limit(cfg.telegram_safe_limit);

    let state = Arc::new(AppState {
        cfg: cfg.clone(),
        moderator: Arc::new(moderator),
        bot_username,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
