//! DirectLine chat session: token, conversation, activities.

use super::error::Error;
use super::types::{
    Activity, ActivitySet, AuthToken, Conversation, ConversationResponse, Interaction,
    TokenRequest, TokenResponse, TokenUser,
};
use crate::config::DirectLineConfig;
use crate::http::{AuthConfig, HttpClient, HttpResponse};
use chrono::Utc;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// One bot conversation over DirectLine.
///
/// Holds at most one open conversation. Every call after [`ChatSession::start`]
/// is addressed by the conversation id obtained there.
#[derive(Debug)]
pub struct ChatSession {
    http: HttpClient,
    secret: AuthConfig,
    user_id: String,
    poll_attempts: u32,
    poll_interval: Duration,
    conversation: Option<Conversation>,
    watermark: Option<String>,
}

impl ChatSession {
    /// Create a session. Fails if no channel secret is configured.
    pub fn new(config: &DirectLineConfig, timeout: Duration) -> Result<Self, Error> {
        let secret = config
            .secret
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or(Error::MissingSecret)?;

        Ok(Self {
            http: HttpClient::new(&config.base_url, timeout),
            secret: AuthConfig::Bearer(secret),
            user_id: format!("dl_{}", uuid::Uuid::new_v4()),
            poll_attempts: config.poll_attempts.max(1),
            poll_interval: config.poll_interval(),
            conversation: None,
            watermark: None,
        })
    }

    /// Use a fixed user id instead of a generated one.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    /// Last watermark returned by the service.
    #[must_use]
    pub fn watermark(&self) -> Option<&str> {
        self.watermark.as_deref()
    }

    /// Mint a token with the channel secret.
    pub async fn acquire_token(&self) -> Result<AuthToken, Error> {
        let body = TokenRequest {
            user: TokenUser { id: &self.user_id },
        };
        let response = self
            .http
            .post_json("/tokens/generate", &self.secret, &body)
            .await?;

        if !response.is(StatusCode::OK) {
            return Err(Error::Auth {
                status: response.status.as_u16(),
                message: response.error_message(),
            });
        }

        let token = token_from(&response, "token")?;
        tracing::debug!(
            conversation_id = %token.conversation_id,
            expires_in = token.expires_in,
            "DirectLine token acquired"
        );
        Ok(token)
    }

    /// Exchange a token that is still valid for a fresh one.
    pub async fn refresh_token(&self, token: &AuthToken) -> Result<AuthToken, Error> {
        let response = self
            .http
            .post_empty("/tokens/refresh", &bearer(token))
            .await?;

        if !response.is(StatusCode::OK) {
            return Err(Error::Auth {
                status: response.status.as_u16(),
                message: response.error_message(),
            });
        }

        let refreshed = token_from(&response, "token refresh")?;
        tracing::debug!(expires_in = refreshed.expires_in, "DirectLine token refreshed");
        Ok(refreshed)
    }

    /// Open a conversation. Only 201 counts as success.
    pub async fn open_conversation(&self, token: &AuthToken) -> Result<Conversation, Error> {
        let response = self.http.post_empty("/conversations", &bearer(token)).await?;

        if !response.is(StatusCode::CREATED) {
            return Err(Error::Conversation {
                status: response.status.as_u16(),
                message: response.error_message(),
            });
        }

        let raw: ConversationResponse = decode(&response, "conversation")?;
        if raw.conversation_id.is_empty() {
            return Err(Error::Schema {
                endpoint: "conversation",
                reason: "empty conversationId",
            });
        }
        if raw.token.is_empty() {
            return Err(Error::Schema {
                endpoint: "conversation",
                reason: "empty token",
            });
        }

        tracing::debug!(conversation_id = %raw.conversation_id, "conversation opened");
        Ok(Conversation {
            id: raw.conversation_id.clone(),
            token: AuthToken {
                conversation_id: raw.conversation_id,
                token: raw.token,
                expires_in: raw.expires_in,
                issued_at: Utc::now(),
            },
            stream_url: raw.stream_url,
        })
    }

    /// Post a user message. Returns whether the service accepted it (200).
    pub async fn send_message(
        &self,
        conversation: &Conversation,
        user_id: &str,
        text: &str,
    ) -> Result<bool, Error> {
        let activity = Activity::message(user_id, text);
        let response = self
            .http
            .post_json(
                &activities_path(&conversation.id),
                &bearer(&conversation.token),
                &activity,
            )
            .await?;

        if response.is(StatusCode::OK) {
            Ok(true)
        } else {
            tracing::warn!("Error sending activity: {}", response.error_message());
            Ok(false)
        }
    }

    /// Read the conversation's activities, newer than `watermark` if given.
    pub async fn fetch_activities(
        &self,
        conversation: &Conversation,
        watermark: Option<&str>,
    ) -> Result<ActivitySet, Error> {
        let query: Vec<(&str, &str)> = watermark.map(|w| vec![("watermark", w)]).unwrap_or_default();
        let response = self
            .http
            .get(
                &activities_path(&conversation.id),
                &bearer(&conversation.token),
                &query,
            )
            .await?;

        if !response.is(StatusCode::OK) {
            return Err(Error::Transport {
                operation: "retrieving activities",
                status: response.status.as_u16(),
                message: response.error_message(),
            });
        }

        decode(&response, "activities")
    }

    /// Acquire a token and open the conversation, once.
    pub async fn start(&mut self) -> Result<&Conversation, Error> {
        if self.conversation.is_none() {
            let token = self.acquire_token().await?;
            let conversation = self.open_conversation(&token).await?;
            self.conversation = Some(conversation);
        }
        self.conversation.as_ref().ok_or(Error::NoConversation)
    }

    /// Send `text` and collect what the conversation returns.
    ///
    /// A rejected send or a failed fetch is logged and the step skipped;
    /// auth and decode failures are returned.
    pub async fn run_interaction(&mut self, text: &str) -> Result<Interaction, Error> {
        self.ensure_fresh_token().await?;
        let conversation = self.conversation.clone().ok_or(Error::NoConversation)?;

        let sent = self
            .send_message(&conversation, &self.user_id, text)
            .await?;

        let mut activities = Vec::new();
        // Start of the last page fetched without a new watermark. The next
        // poll repeats that request, so its page replaces this one.
        let mut unsettled_from = None;
        for attempt in 0..self.poll_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.poll_interval).await;
            }

            let fetched = self
                .fetch_activities(&conversation, self.watermark.as_deref())
                .await;
            match fetched {
                Ok(set) => {
                    if let Some(start) = unsettled_from.take() {
                        activities.truncate(start);
                    }
                    match set.watermark {
                        Some(watermark) => self.watermark = Some(watermark),
                        None => unsettled_from = Some(activities.len()),
                    }
                    let replied = set.activities.iter().any(|a| a.from.id != self.user_id);
                    activities.extend(set.activities);
                    if replied {
                        break;
                    }
                }
                Err(e @ Error::Transport { .. }) => {
                    tracing::warn!("{e}");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Interaction { sent, activities })
    }

    async fn ensure_fresh_token(&mut self) -> Result<(), Error> {
        let Some(conversation) = self.conversation.as_ref() else {
            return Err(Error::NoConversation);
        };
        if !conversation.token.needs_refresh(Utc::now()) {
            return Ok(());
        }

        let refreshed = self.refresh_token(&conversation.token).await?;
        if let Some(conversation) = self.conversation.as_mut() {
            conversation.token = refreshed;
        }
        Ok(())
    }
}

fn bearer(token: &AuthToken) -> AuthConfig {
    AuthConfig::Bearer(token.token.clone())
}

fn activities_path(conversation_id: &str) -> String {
    format!(
        "/conversations/{}/activities",
        urlencoding::encode(conversation_id)
    )
}

fn decode<R: DeserializeOwned>(response: &HttpResponse, endpoint: &'static str) -> Result<R, Error> {
    response
        .decode()
        .map_err(|source| Error::Decode { endpoint, source })
}

fn token_from(response: &HttpResponse, endpoint: &'static str) -> Result<AuthToken, Error> {
    let raw: TokenResponse = decode(response, endpoint)?;
    if raw.conversation_id.is_empty() {
        return Err(Error::Schema {
            endpoint,
            reason: "empty conversationId",
        });
    }
    if raw.token.is_empty() {
        return Err(Error::Schema {
            endpoint,
            reason: "empty token",
        });
    }
    Ok(AuthToken::from_response(raw, Utc::now()))
}
