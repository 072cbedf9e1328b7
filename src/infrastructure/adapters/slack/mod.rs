//! Slack Web API adapter
//!
//! Outbound messages and user/channel lookups only; receiving events is left
//! to whatever feeds the dispatcher.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::RwLock;
use std::time::Duration;

use crate::application::errors::BotError;
use crate::domain::entities::User;
use crate::domain::traits::{Bot, BotInfo, Directory, Notifier};
use crate::infrastructure::config::SlackConfig;

/// Page size for `users.list`
const USERS_PAGE_LIMIT: &str = "200";

#[derive(Debug, Clone, Deserialize)]
pub struct SlackUser {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

impl From<SlackUser> for User {
    fn from(u: SlackUser) -> Self {
        let mut user = User::new(u.id).with_name(u.name);
        user.real_name = u.real_name;
        user
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SlackChannel {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

/// Slack bot adapter
pub struct SlackAdapter {
    token: String,
    api_base: String,
    client: Client,
    info: RwLock<BotInfo>,
    announce_channel: Option<String>,
}

impl SlackAdapter {
    pub fn new(config: &SlackConfig, token: impl Into<String>) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| BotError::Config(e.to_string()))?;

        Ok(Self {
            token: token.into(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
            info: RwLock::new(BotInfo {
                id: "unknown".to_string(),
                name: "pope-bot".to_string(),
            }),
            announce_channel: None,
        })
    }

    pub fn with_announce_channel(mut self, channel: Option<String>) -> Self {
        self.announce_channel = channel;
        self
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    /// Call a Web API method with form parameters and decode its payload
    async fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, &str)]) -> Result<T, BotError> {
        let response = self.client
            .post(self.api_url(method))
            .bearer_auth(&self.token)
            .form(params)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!("Slack API error: {}", response.status())));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Self::unwrap_envelope(method, body)
    }

    /// Slack reports failures in-band as `{ "ok": false, "error": "..." }`
    fn unwrap_envelope<T: DeserializeOwned>(method: &str, body: serde_json::Value) -> Result<T, BotError> {
        if !body.get("ok").and_then(serde_json::Value::as_bool).unwrap_or(false) {
            let error = body
                .get("error")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown_error");
            return Err(match error {
                "user_not_found" | "channel_not_found" | "users_not_found" => {
                    BotError::NotFound(format!("{}: {}", method, error))
                }
                _ => BotError::Api(format!("{}: {}", method, error)),
            });
        }

        serde_json::from_value(body).map_err(|e| BotError::Parse(format!("{}: {}", method, e)))
    }

    async fn open_dm(&self, user_id: &str) -> Result<String, BotError> {
        #[derive(Deserialize)]
        struct Response {
            channel: SlackChannel,
        }

        let data: Response = self.call("conversations.open", &[("users", user_id)]).await?;
        Ok(data.channel.id)
    }

    async fn post_message(&self, channel: &str, text: &str) -> Result<(), BotError> {
        let _: serde_json::Value = self
            .call("chat.postMessage", &[("channel", channel), ("text", text)])
            .await?;
        Ok(())
    }

    async fn channel_name(&self, channel_id: &str) -> Result<String, BotError> {
        #[derive(Deserialize)]
        struct Response {
            channel: SlackChannel,
        }

        let data: Response = self.call("conversations.info", &[("channel", channel_id)]).await?;
        Ok(data.channel.name.unwrap_or(data.channel.id))
    }
}

#[async_trait]
impl Notifier for SlackAdapter {
    async fn send_private(&self, user_id: &str, text: &str) -> Result<(), BotError> {
        tracing::debug!("Sending to {}: {}", user_id, text);
        let channel = self.open_dm(user_id).await?;
        self.post_message(&channel, text).await
    }

    async fn send_channel(&self, text: &str) -> Result<(), BotError> {
        let channel = self
            .announce_channel
            .as_deref()
            .ok_or_else(|| BotError::Config("no announcement channel configured".to_string()))?;
        self.post_message(channel, text).await
    }
}

#[async_trait]
impl Directory for SlackAdapter {
    async fn resolve_user_by_name(&self, name: &str) -> Result<Option<User>, BotError> {
        #[derive(Deserialize)]
        struct Response {
            members: Vec<SlackUser>,
            #[serde(default)]
            response_metadata: Option<Metadata>,
        }

        #[derive(Deserialize)]
        struct Metadata {
            #[serde(default)]
            next_cursor: String,
        }

        let mut cursor = String::new();
        loop {
            let mut params = vec![("limit", USERS_PAGE_LIMIT)];
            if !cursor.is_empty() {
                params.push(("cursor", cursor.as_str()));
            }
            let page: Response = self.call("users.list", &params).await?;

            if let Some(found) = page.members.into_iter().find(|u| !u.deleted && u.name == name) {
                return Ok(Some(found.into()));
            }

            match page.response_metadata.map(|m| m.next_cursor) {
                Some(next) if !next.is_empty() => cursor = next,
                _ => return Ok(None),
            }
        }
    }

    async fn resolve_user_by_id(&self, id: &str) -> Result<User, BotError> {
        #[derive(Deserialize)]
        struct Response {
            user: SlackUser,
        }

        let data: Response = self.call("users.info", &[("user", id)]).await?;
        Ok(data.user.into())
    }

    async fn describe_channel(&self, channel_id: &str) -> Result<String, BotError> {
        match channel_id.chars().next() {
            Some('C') => Ok(format!("In channel `{}`", self.channel_name(channel_id).await?)),
            Some('G') => Ok(format!("In private channel `{}`", self.channel_name(channel_id).await?)),
            Some('D') => Ok("Private messaged me".to_string()),
            _ => Ok("Unknown source".to_string()),
        }
    }
}

#[async_trait]
impl Bot for SlackAdapter {
    async fn start(&self) -> Result<(), BotError> {
        #[derive(Deserialize)]
        struct Response {
            user_id: String,
            user: String,
        }

        let data: Response = self.call("auth.test", &[]).await?;
        tracing::info!("Connected to Slack as {} ({})", data.user, data.user_id);

        if let Ok(mut info) = self.info.write() {
            *info = BotInfo {
                id: data.user_id,
                name: data.user,
            };
        }
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info
            .read()
            .map(|info| info.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}
