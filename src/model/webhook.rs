//! The inbound LINE webhook body.

use crate::error::PayloadError;
use serde::{Deserialize, Serialize};

/// The JSON body posted to the webhook. Only the fields the ledger needs are modelled.
///
/// ```json
/// {
///   "destination": "U0123...",
///   "events": [
///     {
///       "type": "message",
///       "replyToken": "nHuyWiB7yP5Zw52FIkcQobQuGDXCTA",
///       "source": { "type": "user", "userId": "U4af4980629..." },
///       "message": { "id": "444573844083572737", "type": "text", "text": "コーヒー 300" }
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    destination: Option<String>,
    events: Vec<WebhookEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookEvent {
    reply_token: String,
    message: EventMessage,
    source: EventSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventMessage {
    id: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventSource {
    user_id: String,
}

/// A chat message to be interpreted: what was said, by whom, and how to answer privately.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Event {
    pub(crate) reply_token: String,
    pub(crate) text: String,
    pub(crate) message_id: String,
    pub(crate) user_id: String,
}

impl Event {
    pub fn new(
        reply_token: impl Into<String>,
        text: impl Into<String>,
        message_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            reply_token: reply_token.into(),
            text: text.into(),
            message_id: message_id.into(),
            user_id: user_id.into(),
        }
    }

    pub fn reply_token(&self) -> &str {
        &self.reply_token
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl WebhookPayload {
    /// Parses a webhook body and returns its first event. Any further events are ignored. A body
    /// with no events, which LINE sends when verifying the webhook URL, yields `None`.
    pub fn parse(body: &[u8]) -> Result<Option<Event>, PayloadError> {
        let payload: WebhookPayload = serde_json::from_slice(body)?;
        payload.into_event()
    }

    fn into_event(self) -> Result<Option<Event>, PayloadError> {
        let event = match self.events.into_iter().next() {
            Some(event) => event,
            None => return Ok(None),
        };
        let text = event.message.text.ok_or(PayloadError::NoText(0))?;
        Ok(Some(Event {
            reply_token: event.reply_token,
            text,
            message_id: event.message.id,
            user_id: event.source.user_id,
        }))
    }
}
