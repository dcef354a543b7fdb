//! Discord request and response bodies

use serde::{Deserialize, Serialize};

/// Body for both channel messages and webhook executions
#[derive(Debug, Serialize)]
pub(crate) struct MessagePayload<'a> {
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<&'a str>,
    pub tts: bool,
}

/// Error body Discord returns alongside non-2xx statuses
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: u32,
}

/// The bot account behind a token, returned by `GET /users/@me`
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
}
