//! HTTP implementation of the chat service.
#![allow(dead_code)]
//!
//! Speaks the hosted platform's REST surface. Response parsing is lenient:
//! list payloads are accepted bare or wrapped, and individual records decode
//! with defaults rather than failing.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::backend::service::ChatService;
use crate::backend::session::AuthSession;
use crate::config::Settings;
use crate::core::model::{Message, User};
use crate::error::{Error, Result};

/// Chat service over the platform's REST API.
pub struct HttpChatService {
    base_url: String,
    inbox_limit: usize,
    http: reqwest::Client,
    session: Option<AuthSession>,
}

impl HttpChatService {
    /// Build a client from settings, restoring any cached session.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.backend.base_url.trim().to_string();
        if base_url.is_empty() {
            return Err(Error::Config(
                "No backend configured. Run 'tinytalk setup <base_url>' first.".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.backend.request_timeout_secs))
            .build()?;

        let session = settings.session.token.as_deref().map(|token| {
            match settings.session.user_id.as_deref() {
                Some(uid) if !uid.is_empty() => AuthSession::new(token, uid),
                // Older settings may lack the cached uid; recover it from
                // the token's claims.
                _ => AuthSession::from_token(token)
                    .unwrap_or_else(|_| AuthSession::new(token, String::new())),
            }
        });

        Ok(Self {
            base_url,
            inbox_limit: settings.sync.inbox_limit,
            http,
            session,
        })
    }

    /// Attach a session (e.g. right after login).
    pub fn with_session(mut self, session: AuthSession) -> Self {
        self.session = Some(session);
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn require_session(&self) -> Result<&AuthSession> {
        self.session
            .as_ref()
            .ok_or_else(|| Error::Auth("Not logged in. Run 'tinytalk login' first.".to_string()))
    }

    fn current_uid(&self) -> &str {
        self.session
            .as_ref()
            .map(|s| s.user_id.as_str())
            .unwrap_or("")
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let session = self.require_session()?;
        let resp = self
            .http
            .get(self.endpoint(path))
            .bearer_auth(&session.token)
            .query(query)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Backend(format!("GET {} -> HTTP {}", path, resp.status())));
        }
        Ok(resp.json::<Value>().await?)
    }
}

/// Accept a list payload bare or wrapped under one of the given keys.
fn unwrap_records(json: &Value, keys: &[&str]) -> Vec<Value> {
    if let Some(arr) = json.as_array() {
        return arr.clone();
    }
    for key in keys {
        if let Some(arr) = json.get(key).and_then(Value::as_array) {
            return arr.clone();
        }
    }
    Vec::new()
}

/// The partner identity embedded in an inbox record, with a placeholder
/// fallback when the backend sends only the message fields.
fn partner_for(record: &Value, message: &Message) -> User {
    let embedded = record.get("partner").or_else(|| record.get("user"));
    match embedded {
        Some(value) if value.is_object() => User::from_record(value),
        _ => User {
            uid: message.chat_partner_id().to_string(),
            username: String::new(),
            fullname: String::new(),
            profile_image_url: String::new(),
        },
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let body = serde_json::json!({ "email": email, "password": password });
        let resp = self
            .http
            .post(self.endpoint("/v1/auth/login"))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Auth(format!("Login failed: HTTP {}", resp.status())));
        }
        let json: Value = resp.json().await?;

        let token = json
            .get("token")
            .or_else(|| json.get("accessToken"))
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Auth("No token in login response".to_string()))?
            .to_string();

        let mut session = AuthSession::from_token(&token)
            .unwrap_or_else(|_| AuthSession::new(token.clone(), String::new()));

        let uid = json
            .get("uid")
            .or_else(|| json.get("userId"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !uid.is_empty() {
            session.user_id = uid.to_string();
        }

        if session.user_id.is_empty() {
            return Err(Error::Auth("No user id in login response".to_string()));
        }

        tracing::info!("Logged in as {}", session.user_id);
        Ok(session)
    }

    async fn logout(&self) -> Result<()> {
        let session = self.require_session()?;
        let resp = self
            .http
            .post(self.endpoint("/v1/auth/logout"))
            .bearer_auth(&session.token)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Backend(format!("Logout failed: HTTP {}", resp.status())));
        }
        tracing::info!("Logged out {}", session.user_id);
        Ok(())
    }

    async fn fetch_users(&self) -> Result<Vec<User>> {
        let json = self.get_json("/v1/users", &[]).await?;
        let users: Vec<User> = unwrap_records(&json, &["users", "data"])
            .iter()
            .map(User::from_record)
            .collect();

        tracing::debug!("Fetched {} users", users.len());
        Ok(users)
    }

    async fn fetch_inbox(&self) -> Result<Vec<(User, Message)>> {
        let json = self
            .get_json(
                "/v1/messages/recent",
                &[("limit", self.inbox_limit.to_string())],
            )
            .await?;

        let uid = self.current_uid().to_string();
        let batch: Vec<(User, Message)> = unwrap_records(&json, &["messages", "data"])
            .iter()
            .map(|record| {
                let message = Message::from_record(record, &uid);
                let user = partner_for(record, &message);
                (user, message)
            })
            .collect();

        tracing::debug!("Fetched inbox batch of {} observations", batch.len());
        Ok(batch)
    }

    async fn fetch_thread(&self, partner_uid: &str) -> Result<Vec<Message>> {
        let path = format!("/v1/messages/with/{}", partner_uid);
        let json = self.get_json(&path, &[]).await?;

        let uid = self.current_uid().to_string();
        let mut messages: Vec<Message> = unwrap_records(&json, &["messages", "data"])
            .iter()
            .map(|record| Message::from_record(record, &uid))
            .collect();

        // Oldest first for the thread view.
        messages.sort_by_key(|m| m.timestamp);

        tracing::debug!("Fetched {} messages with {}", messages.len(), partner_uid);
        Ok(messages)
    }

    async fn send_message(&self, to_uid: &str, text: &str) -> Result<Message> {
        let session = self.require_session()?;
        let body = serde_json::json!({
            "toId": to_uid,
            "text": text,
            "clientRef": uuid::Uuid::new_v4().to_string(),
        });

        let resp = self
            .http
            .post(self.endpoint("/v1/messages"))
            .bearer_auth(&session.token)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Backend(format!("Send failed: HTTP {}", resp.status())));
        }
        let json: Value = resp.json().await?;

        let record = json.get("message").or_else(|| json.get("data")).unwrap_or(&json);
        let mut message = Message::from_record(record, &session.user_id);

        // Some backends acknowledge without echoing the message.
        if message.from_id.is_empty() && message.to_id.is_empty() {
            message = Message {
                text: text.to_string(),
                from_id: session.user_id.clone(),
                to_id: to_uid.to_string(),
                timestamp: chrono::Utc::now().timestamp_millis(),
                is_from_current_user: true,
            };
        }

        tracing::info!("Sent message to {}", to_uid);
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_records_bare_and_wrapped() {
        let bare = json!([{ "a": 1 }, { "a": 2 }]);
        assert_eq!(unwrap_records(&bare, &["data"]).len(), 2);

        let wrapped = json!({ "messages": [{ "a": 1 }] });
        assert_eq!(unwrap_records(&wrapped, &["messages", "data"]).len(), 1);

        let neither = json!({ "status": "ok" });
        assert!(unwrap_records(&neither, &["messages", "data"]).is_empty());
    }

    #[test]
    fn test_partner_fallback_uses_partner_id() {
        let record = json!({ "fromId": "them", "toId": "me", "text": "hi" });
        let message = Message::from_record(&record, "me");
        let user = partner_for(&record, &message);

        assert_eq!(user.uid, "them");
        assert_eq!(user.username, "");
    }

    #[test]
    fn test_embedded_partner_preferred() {
        let record = json!({
            "fromId": "them",
            "toId": "me",
            "partner": { "uid": "them", "username": "them-handle" }
        });
        let message = Message::from_record(&record, "me");
        let user = partner_for(&record, &message);

        assert_eq!(user.username, "them-handle");
    }

    #[test]
    fn test_from_settings_requires_base_url() {
        let settings = Settings::default();
        assert!(HttpChatService::from_settings(&settings).is_err());
    }
}
