//! Discord HTTP client for bot channel messages and webhooks

use reqwest::{Client, StatusCode};

use crate::error::{NotifyError, NotifyResult};
use crate::payload::{ApiErrorBody, CurrentUser, MessagePayload};

/// Discord REST API base URL
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Maximum number of characters Discord accepts in one message
pub const MESSAGE_LIMIT: usize = 2000;

// Discord JSON error codes
const UNKNOWN_CHANNEL: u32 = 10003;
const UNKNOWN_WEBHOOK: u32 = 10015;

/// Where messages are delivered
#[derive(Debug, Clone)]
pub enum Destination {
    /// A channel addressed by id, using a bot token
    Channel { token: String, channel_id: String },
    /// A webhook URL (carries its own credential)
    Webhook { url: String },
}

impl Destination {
    /// A log-safe description of the destination
    pub fn describe(&self) -> String {
        match self {
            Destination::Channel { channel_id, .. } => format!("channel {}", channel_id),
            Destination::Webhook { url } => {
                // The webhook token is the last path segment
                let preview = url.rsplit_once('/').map(|(head, _)| head).unwrap_or(url);
                format!("webhook {}/...", preview)
            }
        }
    }
}

/// Client for a single Discord destination
#[derive(Clone)]
pub struct DiscordClient {
    destination: Destination,
    api_base: String,
    username: Option<String>,
    http_client: Client,
}

impl DiscordClient {
    /// Create a client that posts to a channel as a bot
    pub fn bot(token: impl Into<String>, channel_id: impl Into<String>) -> NotifyResult<Self> {
        let token = token.into();
        let channel_id = channel_id.into();
        if token.trim().is_empty() {
            return Err(NotifyError::NotConfigured("bot token is empty".to_string()));
        }
        if channel_id.trim().is_empty() {
            return Err(NotifyError::NotConfigured("channel id is empty".to_string()));
        }
        Self::new(Destination::Channel { token, channel_id })
    }

    /// Create a client that posts to a webhook URL
    pub fn webhook(url: impl Into<String>) -> NotifyResult<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(NotifyError::NotConfigured("webhook URL is empty".to_string()));
        }
        Self::new(Destination::Webhook { url })
    }

    fn new(destination: Destination) -> NotifyResult<Self> {
        let http_client = Client::builder()
            .user_agent(concat!(
                "DiscordBot (https://github.com/diskwatch/diskwatch, ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .build()?;

        Ok(Self {
            destination,
            api_base: DISCORD_API_BASE.to_string(),
            username: None,
            http_client,
        })
    }

    /// Override the API base URL (self-hosted proxies, tests)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the display name used for webhook messages
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Verify the credentials before the first delivery
    ///
    /// For bots this resolves the token's user; for webhooks it fetches
    /// the webhook object, which fails if the URL was revoked.
    pub async fn login(&self) -> NotifyResult<Option<CurrentUser>> {
        match &self.destination {
            Destination::Channel { token, .. } => {
                let response = self
                    .http_client
                    .get(format!("{}/users/@me", self.api_base))
                    .header("Authorization", format!("Bot {}", token))
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(self.classify(status, body));
                }

                let user: CurrentUser = response.json().await?;
                tracing::info!(user = %user.username, id = %user.id, "Logged in to Discord");
                Ok(Some(user))
            }
            Destination::Webhook { url } => {
                let response = self.http_client.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(self.classify(status, body));
                }
                tracing::info!(destination = %self.destination.describe(), "Discord webhook reachable");
                Ok(None)
            }
        }
    }

    /// Send `content`, split into as many messages as Discord's size
    /// limit requires
    pub async fn send(&self, content: &str) -> NotifyResult<()> {
        for chunk in split_message(content, MESSAGE_LIMIT) {
            self.send_one(&chunk).await?;
        }
        Ok(())
    }

    async fn send_one(&self, content: &str) -> NotifyResult<()> {
        let request = match &self.destination {
            Destination::Channel { token, channel_id } => {
                let payload = MessagePayload {
                    content,
                    username: None,
                    avatar_url: None,
                    tts: false,
                };
                self.http_client
                    .post(format!("{}/channels/{}/messages", self.api_base, channel_id))
                    .header("Authorization", format!("Bot {}", token))
                    .json(&payload)
            }
            Destination::Webhook { url } => {
                let payload = MessagePayload {
                    content,
                    username: self.username.as_deref(),
                    avatar_url: None,
                    tts: false,
                };
                self.http_client.post(url).json(&payload)
            }
        };

        let response = request.send().await?;

        // Webhooks answer 204 No Content, channel messages 200
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.classify(status, body));
        }

        tracing::debug!(
            destination = %self.destination.describe(),
            chars = content.chars().count(),
            "Message delivered"
        );
        Ok(())
    }

    fn classify(&self, status: StatusCode, body: String) -> NotifyError {
        classify_response(&self.destination, status.as_u16(), body)
    }
}

/// Map a non-success Discord response to a [`NotifyError`]
pub(crate) fn classify_response(destination: &Destination, status: u16, body: String) -> NotifyError {
    let code = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.code)
        .ok();

    let unknown_target = matches!(code, Some(UNKNOWN_CHANNEL) | Some(UNKNOWN_WEBHOOK));
    if status == 404 || unknown_target {
        let channel = match destination {
            Destination::Channel { channel_id, .. } => channel_id.clone(),
            Destination::Webhook { .. } => destination.describe(),
        };
        return NotifyError::ChannelNotFound { channel };
    }

    match status {
        401 | 403 => NotifyError::Unauthorized { status, body },
        _ => NotifyError::Api { status, body },
    }
}

/// Split `content` into chunks of at most `limit` characters
///
/// Splits on line boundaries where possible; a single line longer than
/// the limit is cut at character boundaries.
pub fn split_message(content: &str, limit: usize) -> Vec<String> {
    if content.chars().count() <= limit {
        return vec![content.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in content.split('\n') {
        let line_len = line.chars().count();
        let needed = if current.is_empty() { line_len } else { line_len + 1 };

        if current_len + needed <= limit {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            current_len += needed;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len <= limit {
            current.push_str(line);
            current_len = line_len;
        } else {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
