//! LINE Messaging API channel — webhook payload types, signature
//! verification, reply encoding and delivery, and the best-effort typing
//! indicator.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::Sha256;

use crate::cards::BotReply;
use crate::error::ChannelError;

/// Hard cap on outbound text; LINE rejects longer messages.
pub const MAX_REPLY_TEXT_CHARS: usize = 4900;

/// Bound on reply delivery. One attempt, no retry.
const REPLY_TIMEOUT: Duration = Duration::from_secs(30);

/// Bound on the best-effort typing-indicator call.
const LOADING_TIMEOUT: Duration = Duration::from_secs(10);

/// How long LINE keeps the typing indicator up.
const LOADING_SECONDS: u32 = 20;

const DEFAULT_BASE_URL: &str = "https://api.line.me";

// ── Webhook payload types ───────────────────────────────────────────

/// Envelope LINE POSTs to the webhook endpoint.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// One inbound event. Anything but a text message is a no-op.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub message: Option<EventMessage>,
    #[serde(rename = "replyToken")]
    pub reply_token: Option<String>,
    pub source: Option<EventSource>,
}

#[derive(Debug, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventSource {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl WebhookEvent {
    /// The text of a plain text-message event, if this is one.
    pub fn text_message(&self) -> Option<&str> {
        if self.event_type != "message" {
            return None;
        }
        let message = self.message.as_ref()?;
        if message.message_type != "text" {
            return None;
        }
        message.text.as_deref()
    }
}

// ── Signature verification ──────────────────────────────────────────

/// Verify an `X-Line-Signature` header: base64(HMAC-SHA256(secret, body)).
pub fn verify_signature(channel_secret: &SecretString, body: &[u8], signature: &str) -> bool {
    let Ok(decoded) = BASE64.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(channel_secret.expose_secret().as_bytes())
    else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&decoded).is_ok()
}

// ── Channel ─────────────────────────────────────────────────────────

/// Outbound LINE Messaging API client.
#[derive(Clone)]
pub struct LineChannel {
    access_token: SecretString,
    base_url: String,
    client: reqwest::Client,
}

impl LineChannel {
    pub fn new(access_token: SecretString) -> Self {
        Self {
            access_token,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the API base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Deliver the reply for one webhook event.
    pub async fn reply(&self, reply_token: &str, reply: &BotReply) -> Result<(), ChannelError> {
        let payload = json!({
            "replyToken": reply_token,
            "messages": [encode_message(reply)]
        });

        let resp = self
            .client
            .post(self.api_url("/v2/bot/message/reply"))
            .bearer_auth(self.access_token.expose_secret())
            .timeout(REPLY_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChannelError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Show the typing indicator while the model call runs.
    ///
    /// Best effort: failures are logged and swallowed. Callers spawn this
    /// as a detached task; the reply path never joins it.
    pub async fn send_loading(&self, chat_id: &str) {
        let payload = json!({
            "chatId": chat_id,
            "loadingSeconds": LOADING_SECONDS
        });

        let result = self
            .client
            .post(self.api_url("/v2/bot/chat/loading/start"))
            .bearer_auth(self.access_token.expose_secret())
            .timeout(LOADING_TIMEOUT)
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(resp) if !resp.status().is_success() => {
                tracing::warn!(status = %resp.status(), "Loading animation rejected");
            }
            Err(e) => tracing::warn!(error = %e, "Loading animation failed"),
            Ok(_) => {}
        }
    }
}

// ── Reply encoding ──────────────────────────────────────────────────

/// Encode a normalized reply as one LINE message object.
pub fn encode_message(reply: &BotReply) -> Value {
    match reply {
        BotReply::Flex(flex) => json!({
            "type": "flex",
            "altText": flex.alt_text,
            "contents": flex.contents
        }),
        BotReply::Text(text) => json!({
            "type": "text",
            "text": truncate_chars(text, MAX_REPLY_TEXT_CHARS)
        }),
    }
}

/// Truncate to at most `max` characters, respecting char boundaries.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ── Tests ───────────────────────────────────────────────────────────
