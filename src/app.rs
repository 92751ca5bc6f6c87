//! Builds the watcher from configuration and runs it.

use crate::background::PollLoop;
use crate::config::{AppConfig, NotifierKind, SourceKind};
use crate::errors::startup_error::StartupError;
use crate::http::RetryingClient;
use crate::notifiers::{DesktopChannel, Notifier, NotifyChannel, TelegramChannel};
use crate::sources::storefront_page::listing_url;
use crate::sources::{InventoryApiSource, StaticPageSession, StockSource, StorefrontPageSource};
use crate::state::LoopReport;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Construct the stock source selected by `STOCK_SOURCE`.
pub fn build_source(config: &AppConfig) -> Result<Box<dyn StockSource>, StartupError> {
    let client = RetryingClient::new(config.http_timeout(), config.retry_policy())?;

    let source: Box<dyn StockSource> = match config.stock_source {
        SourceKind::Api => Box::new(InventoryApiSource::new(
            client,
            config.inventory_api_url.clone(),
            config.target_sku.clone(),
            config.locale.clone(),
            config.display_name(),
        )),
        SourceKind::Page => {
            let url = listing_url(
                &config.storefront_url,
                &config.locale,
                config.storefront_page_size,
                config.listing_model(),
            )
            .map_err(|reason| StartupError::InvalidUrl {
                url: config.storefront_url.clone(),
                reason,
            })?;

            Box::new(StorefrontPageSource::new(
                StaticPageSession::new(client),
                url.to_string(),
                config.listing_name(),
                config.in_stock_sentinel.clone(),
                config.page_wait(),
            ))
        }
    };

    info!(source = source.name(), target = %config.display_name(), "Stock source ready");
    Ok(source)
}

/// Construct the notification channel selected by `NOTIFIER`.
pub fn build_channel(config: &AppConfig) -> Result<Box<dyn NotifyChannel>, StartupError> {
    match config.notifier {
        NotifierKind::Telegram => {
            let (Some(token), Some(chat_id)) =
                (&config.telegram_bot_token, &config.telegram_chat_id)
            else {
                return Err(StartupError::Notifier(
                    "telegram notifier requires a bot token and chat id".to_string(),
                ));
            };
            let channel = TelegramChannel::new(
                config.telegram_api_url.clone(),
                token.clone(),
                chat_id.clone(),
                config.http_timeout(),
            )?;
            Ok(Box::new(channel))
        }
        NotifierKind::Desktop => Ok(Box::new(DesktopChannel::new())),
    }
}

/// Pair an already-built source with a notifier.
///
/// If the channel cannot be built the source is closed before the error is
/// returned, so a partially initialised watcher never leaks its session.
pub async fn assemble<F>(
    config: &AppConfig,
    mut source: Box<dyn StockSource>,
    make_channel: F,
) -> Result<PollLoop, StartupError>
where
    F: FnOnce(&AppConfig) -> Result<Box<dyn NotifyChannel>, StartupError>,
{
    let channel = match make_channel(config) {
        Ok(channel) => channel,
        Err(e) => {
            error!(error = %e, "Notifier setup failed, releasing stock source");
            source.close().await;
            return Err(e);
        }
    };

    let notifier = Notifier::new(
        channel,
        config.display_name(),
        config.reference_url.clone(),
    );
    Ok(PollLoop::new(source, notifier, config.poll_interval()))
}

/// Build everything from `config` and poll until `shutdown` is cancelled.
pub async fn run(
    config: AppConfig,
    shutdown: CancellationToken,
) -> Result<LoopReport, StartupError> {
    let source = build_source(&config)?;
    let poll_loop = assemble(&config, source, build_channel).await?;
    Ok(poll_loop.run(shutdown).await)
}
