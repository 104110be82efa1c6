/*
 * Responsibility
 * - メッセージキー (error code) → 表示用テキストの解決
 * - キーが無いのは正常系 (None)。失敗として扱わない
 */
use std::collections::HashMap;

use async_trait::async_trait;

#[async_trait]
pub trait LocalizationService: Send + Sync {
    /// Resolve `key` to human text. A missing key is `None`, not an error.
    async fn resolve(&self, key: &str) -> Option<String>;
}

/// English messages for the standard OAuth2 / OIDC error codes.
#[derive(Debug, Clone)]
pub struct StaticLocalizationService {
    messages: HashMap<String, String>,
}

const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    ("invalid_request", "The request is missing a required parameter or is otherwise malformed."),
    ("unauthorized_client", "The client is not authorized to request an authorization."),
    ("access_denied", "The resource owner or authorization server denied the request."),
    ("unsupported_response_type", "The requested response type is not supported."),
    ("unsupported_response_mode", "The requested response mode is not supported."),
    ("invalid_scope", "The requested scope is invalid, unknown, or not allowed for this client."),
    ("server_error", "An unexpected error occurred while processing the request."),
    ("temporarily_unavailable", "The service is temporarily unavailable. Please try again later."),
    ("interaction_required", "User interaction is required to continue."),
    ("login_required", "You need to sign in to continue."),
    ("consent_required", "Your consent is required to continue."),
];

impl StaticLocalizationService {
    pub fn new() -> Self {
        Self::from_entries(DEFAULT_MESSAGES.iter().copied())
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let messages = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { messages }
    }
}

impl Default for StaticLocalizationService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocalizationService for StaticLocalizationService {
    async fn resolve(&self, key: &str) -> Option<String> {
        self.messages.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_known_codes() {
        let svc = StaticLocalizationService::new();
        let msg = svc.resolve("invalid_scope").await;
        assert!(msg.is_some_and(|m| m.contains("scope")));
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let svc = StaticLocalizationService::new();
        assert_eq!(svc.resolve("no_such_code").await, None);
        assert_eq!(svc.resolve("").await, None);
    }

    #[tokio::test]
    async fn custom_entries_replace_defaults() {
        let svc = StaticLocalizationService::from_entries([("foo", "foo error message")]);
        assert_eq!(svc.resolve("foo").await.as_deref(), Some("foo error message"));
        assert_eq!(svc.resolve("invalid_scope").await, None);
    }
}
