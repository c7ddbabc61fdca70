//! One-time notices stored in the session.
//!
//! A handler pushes a message before redirecting; the next page that renders
//! takes every pending message out of the session and shows it once.

use std::fmt;

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

/// Visual category of a flash message (used as a CSS class suffix).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Info,
    Danger,
}

impl fmt::Display for FlashLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Info => f.write_str("info"),
            Self::Danger => f.write_str("danger"),
        }
    }
}

/// A message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

impl FlashMessage {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Danger,
            message: message.into(),
        }
    }
}

/// Queue a message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn push(
    session: &Session,
    message: FlashMessage,
) -> Result<(), tower_sessions::session::Error> {
    let mut pending: Vec<FlashMessage> = session
        .get(session_keys::FLASH)
        .await?
        .unwrap_or_default();
    pending.push(message);
    session.insert(session_keys::FLASH, pending).await
}

/// Remove and return all pending messages.
///
/// Session failures are logged and treated as "no messages" so a broken
/// session store never prevents a page from rendering.
pub async fn take(session: &Session) -> Vec<FlashMessage> {
    match session
        .remove::<Vec<FlashMessage>>(session_keys::FLASH)
        .await
    {
        Ok(messages) => messages.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read flash messages");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_take_returns_messages_in_push_order() {
        let session = session();
        push(&session, FlashMessage::success("Product added!"))
            .await
            .unwrap();
        push(&session, FlashMessage::danger("Second")).await.unwrap();

        let messages = take(&session).await;
        assert_eq!(
            messages,
            vec![
                FlashMessage::success("Product added!"),
                FlashMessage::danger("Second"),
            ]
        );
    }

    #[tokio::test]
    async fn test_take_is_one_time() {
        let session = session();
        push(&session, FlashMessage::info("hello")).await.unwrap();

        assert_eq!(take(&session).await.len(), 1);
        assert!(take(&session).await.is_empty());
    }

    #[tokio::test]
    async fn test_take_on_empty_session() {
        assert!(take(&session()).await.is_empty());
    }

    #[test]
    fn test_level_display_matches_css_classes() {
        assert_eq!(FlashLevel::Success.to_string(), "success");
        assert_eq!(FlashLevel::Info.to_string(), "info");
        assert_eq!(FlashLevel::Danger.to_string(), "danger");
    }
}
