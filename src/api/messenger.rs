//! Delivery of text messages through the LINE Messaging API.

use crate::api::Messenger;
use crate::Result;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, trace};

/// The production LINE API endpoint.
pub(crate) const LINE_API_URL: &str = "https://api.line.me";

/// LINE rejects empty text messages, so this is sent instead.
const EMPTY_TEXT: &str = "エラーが発生しました";

/// Sends messages with the LINE Messaging API.
#[derive(Debug, Clone)]
pub(crate) struct LineMessenger {
    base_url: String,
    channel_access_token: String,
    http: reqwest::Client,
}

impl LineMessenger {
    pub(crate) fn new(base_url: impl Into<String>, channel_access_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            channel_access_token: channel_access_token.into(),
            http: reqwest::Client::new(),
        }
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<()> {
        let url = format!("{}{path}", self.base_url);
        trace!("POST {url}");
        let response = self
            .http
            .post(&url)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/json; charset=UTF-8",
            )
            .bearer_auth(&self.channel_access_token)
            .body(body.to_string())
            .send()
            .await
            .with_context(|| format!("Failed to send the request to {url}"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            bail!("LINE API request to {path} failed with status {status}: {body}");
        }
        debug!("LINE API request to {path} succeeded");
        Ok(())
    }
}

fn messages(text: &str) -> serde_json::Value {
    let text = if text.is_empty() { EMPTY_TEXT } else { text };
    json!([{ "type": "text", "text": text }])
}

#[async_trait::async_trait]
impl Messenger for LineMessenger {
    async fn reply(&mut self, reply_token: &str, text: &str) -> Result<()> {
        self.post(
            "/v2/bot/message/reply",
            json!({ "replyToken": reply_token, "messages": messages(text) }),
        )
        .await
    }

    async fn broadcast(&mut self, text: &str) -> Result<()> {
        self.post(
            "/v2/bot/message/broadcast",
            json!({ "messages": messages(text) }),
        )
        .await
    }
}

/// A message that was handed to a `Messenger`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "channel")]
pub enum Delivery {
    Reply { reply_token: String, text: String },
    Broadcast { text: String },
}

/// Records deliveries instead of sending them. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct TestMessenger {
    sent: Arc<Mutex<Vec<Delivery>>>,
}

impl TestMessenger {
    /// Everything delivered so far, oldest first.
    pub fn sent(&self) -> Vec<Delivery> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    fn push(&self, delivery: Delivery) -> Result<()> {
        info!("Test delivery: {delivery:?}");
        match self.sent.lock() {
            Ok(mut sent) => {
                sent.push(delivery);
                Ok(())
            }
            Err(_) => bail!("The test messenger is poisoned"),
        }
    }
}

#[async_trait::async_trait]
impl Messenger for TestMessenger {
    async fn reply(&mut self, reply_token: &str, text: &str) -> Result<()> {
        self.push(Delivery::Reply {
            reply_token: reply_token.to_string(),
            text: text.to_string(),
        })
    }

    async fn broadcast(&mut self, text: &str) -> Result<()> {
        self.push(Delivery::Broadcast {
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_body() {
        assert_eq!(
            messages("こんにちは"),
            json!([{ "type": "text", "text": "こんにちは" }])
        );
        assert_eq!(
            messages(""),
            json!([{ "type": "text", "text": "エラーが発生しました" }])
        );
    }

    #[test]
    fn test_trailing_slash() {
        let messenger = LineMessenger::new("http://localhost:9000/", "token");
        assert_eq!(messenger.base_url, "http://localhost:9000");
    }

    #[tokio::test]
    async fn test_messenger_records() {
        let messenger = TestMessenger::default();
        let mut boxed: Box<dyn Messenger + Send> = Box::new(messenger.clone());
        boxed.reply("tok", "hi").await.unwrap();
        boxed.broadcast("all").await.unwrap();
        assert_eq!(
            messenger.sent(),
            vec![
                Delivery::Reply {
                    reply_token: "tok".to_string(),
                    text: "hi".to_string()
                },
                Delivery::Broadcast {
                    text: "all".to_string()
                },
            ]
        );
    }
}
