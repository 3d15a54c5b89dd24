//! DirectLine wire records and session-level values.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Public DirectLine endpoint.
pub const DEFAULT_BASE_URL: &str = "https://directline.botframework.com/v3/directline";

/// Tokens expiring within this window are refreshed before use.
const REFRESH_THRESHOLD_SECS: i64 = 5 * 60;

/// Body of `POST /tokens/generate`.
#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    #[serde(rename = "User")]
    pub user: TokenUser<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenUser<'a> {
    #[serde(rename = "Id")]
    pub id: &'a str,
}

/// Response of `POST /tokens/generate` and `POST /tokens/refresh`.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(rename = "conversationId")]
    pub conversation_id: String,
    pub token: String,
    pub expires_in: u64,
}

/// Response of `POST /conversations`.
#[derive(Debug, Deserialize)]
pub(crate) struct ConversationResponse {
    #[serde(rename = "conversationId")]
    pub conversation_id: String,
    pub token: String,
    pub expires_in: u64,
    #[serde(rename = "streamUrl", default)]
    pub stream_url: Option<String>,
}

/// Bearer token minted for one conversation.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub conversation_id: String,
    pub token: String,
    /// Lifetime in seconds, as reported by the service.
    pub expires_in: u64,
    pub issued_at: DateTime<Utc>,
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("conversation_id", &self.conversation_id)
            .field("token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

impl AuthToken {
    pub(crate) fn from_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        Self {
            conversation_id: response.conversation_id,
            token: response.token,
            expires_in: response.expires_in,
            issued_at,
        }
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        let secs = i64::try_from(self.expires_in.min(u64::from(u32::MAX))).unwrap_or(0);
        self.issued_at + TimeDelta::seconds(secs)
    }

    /// True if the token expires within five minutes of `now`.
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at() - now < TimeDelta::seconds(REFRESH_THRESHOLD_SECS)
    }
}

/// An open conversation and the token scoped to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    pub token: AuthToken,
    /// WebSocket stream URL. Returned by the service but never connected to.
    pub stream_url: Option<String>,
}

/// Sender or recipient of an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A single chat turn exchanged with the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub from: ChannelAccount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Activity {
    /// Outgoing user message.
    #[must_use]
    pub fn message(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: "message".to_string(),
            id: None,
            timestamp: None,
            from: ChannelAccount {
                id: user_id.into(),
                name: None,
            },
            text: Some(text.into()),
        }
    }
}

/// One page of activities from `GET /conversations/{id}/activities`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActivitySet {
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub watermark: Option<String>,
}

/// Outcome of sending one message and reading back the conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interaction {
    pub sent: bool,
    pub activities: Vec<Activity>,
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sent {
            writeln!(f, "Successfully sent message to the bot.")?;
        }
        if self.activities.is_empty() {
            return Ok(());
        }
        writeln!(f, "Received messages from the bot:")?;
        for activity in &self.activities {
            writeln!(f, "  - Type: {}", activity.kind)?;
            writeln!(f, "    - From: {}", activity.from.id)?;
            writeln!(
                f,
                "    - Text: {}",
                activity.text.as_deref().unwrap_or("(none)")
            )?;
        }
        Ok(())
    }
}
