//! Notification delivery seam

use async_trait::async_trait;
use discord_notify::DiscordClient;

use crate::config::DiscordTarget;
use crate::error::NotifyResult;

/// Something that can deliver a rendered report
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Get the name of this notifier
    fn name(&self) -> &str;

    /// Deliver `text`, succeeding only once the destination accepted it
    async fn deliver(&self, text: &str) -> NotifyResult<()>;
}

#[async_trait]
impl Notifier for DiscordClient {
    fn name(&self) -> &str {
        "discord"
    }

    async fn deliver(&self, text: &str) -> NotifyResult<()> {
        self.send(text).await
    }
}

/// Build the Discord client for a resolved target
pub fn discord_client(target: &DiscordTarget, username: &str) -> NotifyResult<DiscordClient> {
    match target {
        DiscordTarget::Webhook { url } => {
            Ok(DiscordClient::webhook(url.clone())?.with_username(username))
        }
        DiscordTarget::Bot { token, channel_id } => {
            DiscordClient::bot(token.clone(), channel_id.clone())
        }
    }
}
