/*
 * Responsibility
 * - 登録済みクライアント (client_id / redirect_uri / scope) に対する最小限の検証
 * - redirect_uri は登録と一致して初めて ValidatedAuthorizeRequest に載せる
 *   (未検証の URI へは決してエコーしない)
 *
 * Notes
 * - redirect_uri が確定するまでのエラーは User、確定後は Client
 */
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::validator::{AuthorizeRequestValidator, ValidatorError};
use crate::services::authorize::{
    AuthorizeParameters, ResponseMode, UserContext, ValidatedAuthorizeRequest, ValidationOutcome,
};
use crate::services::scopes::ScopeCatalog;

const SINGLE_VALUED: &[&str] = &[
    "client_id",
    "redirect_uri",
    "response_type",
    "response_mode",
    "scope",
    "state",
    "nonce",
];

// Normalised (sorted, space-joined) response types.
const SUPPORTED_RESPONSE_TYPES: &[&str] = &[
    "code",
    "token",
    "id_token",
    "id_token token",
    "code id_token",
    "code token",
    "code id_token token",
];

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RegisteredClient {
    pub client_id: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    #[serde(default)]
    pub allowed_scopes: Vec<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Default)]
pub struct ClientStore {
    clients: HashMap<String, RegisteredClient>,
}

impl ClientStore {
    pub fn new(clients: impl IntoIterator<Item = RegisteredClient>) -> Self {
        Self {
            clients: clients
                .into_iter()
                .map(|c| (c.client_id.clone(), c))
                .collect(),
        }
    }

    /// Parse a JSON array of clients.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let clients: Vec<RegisteredClient> = serde_json::from_str(json)?;
        Ok(Self::new(clients))
    }

    pub fn find(&self, client_id: &str) -> Option<&RegisteredClient> {
        self.clients.get(client_id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ClientStoreValidator {
    clients: ClientStore,
    scopes: Arc<ScopeCatalog>,
}

impl ClientStoreValidator {
    pub fn new(clients: ClientStore, scopes: Arc<ScopeCatalog>) -> Self {
        Self { clients, scopes }
    }

    fn check(
        &self,
        params: &AuthorizeParameters,
        user: Option<&UserContext>,
    ) -> ValidationOutcome {
        if let Some(name) = SINGLE_VALUED.iter().find(|name| params.count(name) > 1) {
            return ValidationOutcome::user_error("invalid_request", None)
                .with_description(format!("{name} must not be repeated"));
        }

        let Some(client_id) = params.get("client_id") else {
            return ValidationOutcome::user_error("invalid_request", None)
                .with_description("client_id is missing");
        };

        let mut request = ValidatedAuthorizeRequest::new(client_id);
        request.state = params.get("state").map(str::to_string);
        request.nonce = params.get("nonce").map(str::to_string);
        request.subject = user.map(|u| u.subject.clone());

        let explicit_mode = params.get("response_mode");
        let parsed_mode = explicit_mode.and_then(ResponseMode::parse);
        if let Some(mode) = parsed_mode {
            request.response_mode = mode;
        }

        let Some(client) = self.clients.find(client_id).filter(|c| c.enabled) else {
            return ValidationOutcome::user_error("unauthorized_client", Some(request))
                .with_description("unknown or disabled client");
        };
        request.client_name = client.client_name.clone();

        let Some(redirect_uri) = params.get("redirect_uri") else {
            return ValidationOutcome::user_error("invalid_request", Some(request))
                .with_description("redirect_uri is missing");
        };
        if Url::parse(redirect_uri).is_err() {
            return ValidationOutcome::user_error("invalid_request", Some(request))
                .with_description("redirect_uri must be an absolute URI");
        }
        if !client.redirect_uris.iter().any(|uri| uri == redirect_uri) {
            return ValidationOutcome::user_error("unauthorized_client", Some(request))
                .with_description("redirect_uri is not registered for this client");
        }
        request.redirect_uri = redirect_uri.to_string();

        // From here on the echo target is verified.
        let Some(response_type) = params.get("response_type") else {
            return ValidationOutcome::client_error("unsupported_response_type", Some(request))
                .with_description("response_type is missing");
        };
        let response_type = normalize_response_type(response_type);
        if !SUPPORTED_RESPONSE_TYPES.contains(&response_type.as_str()) {
            return ValidationOutcome::client_error("unsupported_response_type", Some(request));
        }
        let issues_tokens = response_type.split(' ').any(|t| t == "token" || t == "id_token");
        request.response_type = Some(response_type.clone());

        match (explicit_mode, parsed_mode) {
            (Some(_), None) => {
                return ValidationOutcome::client_error("invalid_request", Some(request))
                    .with_description("unknown response_mode");
            }
            (Some(_), Some(ResponseMode::Query)) if issues_tokens => {
                return ValidationOutcome::client_error("invalid_request", Some(request))
                    .with_description("response_mode query is not allowed for this response_type");
            }
            (None, _) => {
                request.response_mode = if issues_tokens {
                    ResponseMode::Fragment
                } else {
                    ResponseMode::Query
                };
            }
            _ => {}
        }

        let Some(scope) = params.get("scope") else {
            return ValidationOutcome::client_error("invalid_scope", Some(request))
                .with_description("scope is missing");
        };
        let scopes: Vec<String> = scope.split_whitespace().map(str::to_string).collect();
        if scopes.is_empty() {
            return ValidationOutcome::client_error("invalid_scope", Some(request));
        }
        if let Some(unknown) = scopes.iter().find(|s| !self.scopes.contains(s)) {
            let description = format!("scope {unknown} is not supported");
            return ValidationOutcome::client_error("invalid_scope", Some(request))
                .with_description(description);
        }
        if let Some(denied) = scopes.iter().find(|s| !client.allowed_scopes.contains(s)) {
            let description = format!("scope {denied} is not allowed for this client");
            return ValidationOutcome::client_error("invalid_scope", Some(request))
                .with_description(description);
        }
        let wants_id_token = response_type.split(' ').any(|t| t == "id_token");
        if wants_id_token && !scopes.iter().any(|s| s == "openid") {
            return ValidationOutcome::client_error("invalid_scope", Some(request))
                .with_description("openid scope is required for id_token");
        }
        request.requested_scopes = scopes;

        if wants_id_token && !response_type.contains("code") && request.nonce.is_none() {
            return ValidationOutcome::client_error("invalid_request", Some(request))
                .with_description("nonce is required for implicit id_token requests");
        }

        ValidationOutcome::success(request)
    }
}

#[async_trait]
impl AuthorizeRequestValidator for ClientStoreValidator {
    async fn validate(
        &self,
        parameters: &AuthorizeParameters,
        user: Option<&UserContext>,
    ) -> Result<ValidationOutcome, ValidatorError> {
        Ok(self.check(parameters, user))
    }
}

fn normalize_response_type(value: &str) -> String {
    let mut parts: Vec<&str> = value.split_whitespace().collect();
    parts.sort_unstable();
    parts.dedup();
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::authorize::ErrorKind;

    fn store() -> ClientStore {
        ClientStore::from_json(
            r#"[
                {
                    "client_id": "web",
                    "client_name": "Web App",
                    "redirect_uris": ["https://web.example/cb"],
                    "allowed_scopes": ["openid", "profile", "email", "payments"]
                },
                {
                    "client_id": "off",
                    "redirect_uris": ["https://off.example/cb"],
                    "allowed_scopes": ["openid"],
                    "enabled": false
                }
            ]"#,
        )
        .unwrap()
    }

    fn base() -> AuthorizeParameters {
        AuthorizeParameters::new()
            .with("client_id", "web")
            .with("redirect_uri", "https://web.example/cb")
            .with("response_type", "code")
            .with("scope", "openid profile")
            .with("state", "abc")
    }

    fn base_with_scope(scope: &str) -> AuthorizeParameters {
        AuthorizeParameters::new()
            .with("client_id", "web")
            .with("redirect_uri", "https://web.example/cb")
            .with("response_type", "code")
            .with("scope", scope)
    }

    async fn run(params: AuthorizeParameters) -> ValidationOutcome {
        ClientStoreValidator::new(store(), Arc::new(ScopeCatalog::standard()))
            .validate(&params, Some(&UserContext::new("alice")))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn accepts_registered_code_request() {
        let outcome = run(base()).await;
        assert!(!outcome.is_error());

        let req = outcome.validated_request.unwrap();
        assert_eq!(req.client_name.as_deref(), Some("Web App"));
        assert_eq!(req.response_mode, ResponseMode::Query);
        assert_eq!(req.requested_scopes, vec!["openid", "profile"]);
        assert_eq!(req.subject.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn missing_client_id_is_user_error_without_echo() {
        let outcome = run(AuthorizeParameters::new().with("state", "abc")).await;
        assert_eq!(outcome.error_kind, ErrorKind::User);
        assert_eq!(outcome.error_code, "invalid_request");
        assert!(outcome.validated_request.is_none());
    }

    #[tokio::test]
    async fn unknown_or_disabled_client_is_unauthorized() {
        let params = AuthorizeParameters::new()
            .with("client_id", "off")
            .with("redirect_uri", "https://off.example/cb");
        let outcome = run(params).await;
        assert_eq!(outcome.error_code, "unauthorized_client");
        assert_eq!(outcome.error_kind, ErrorKind::User);
    }

    #[tokio::test]
    async fn unregistered_redirect_uri_is_never_recorded() {
        let params = AuthorizeParameters::new()
            .with("client_id", "web")
            .with("redirect_uri", "https://evil.example/cb")
            .with("state", "abc");
        let outcome = run(params).await;

        assert_eq!(outcome.error_code, "unauthorized_client");
        let req = outcome.validated_request.unwrap();
        assert!(req.redirect_uri.is_empty());
        assert_eq!(req.state.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn errors_after_redirect_check_are_client_errors_with_echo() {
        let params = AuthorizeParameters::new()
            .with("client_id", "web")
            .with("redirect_uri", "https://web.example/cb")
            .with("response_type", "code")
            .with("scope", "openid admin");
        let outcome = run(params).await;

        assert_eq!(outcome.error_kind, ErrorKind::Client);
        assert_eq!(outcome.error_code, "invalid_scope");
        assert_eq!(
            outcome.validated_request.unwrap().redirect_uri,
            "https://web.example/cb"
        );
    }

    #[tokio::test]
    async fn unsupported_response_type() {
        let params = AuthorizeParameters::new()
            .with("client_id", "web")
            .with("redirect_uri", "https://web.example/cb")
            .with("response_type", "magic");
        let outcome = run(params).await;
        assert_eq!(outcome.error_code, "unsupported_response_type");
    }

    #[tokio::test]
    async fn implicit_defaults_to_fragment_and_rejects_query() {
        let params = AuthorizeParameters::new()
            .with("client_id", "web")
            .with("redirect_uri", "https://web.example/cb")
            .with("response_type", "token id_token")
            .with("scope", "openid")
            .with("nonce", "n");
        let outcome = run(params.clone()).await;
        assert!(!outcome.is_error());
        assert_eq!(
            outcome.validated_request.unwrap().response_mode,
            ResponseMode::Fragment
        );

        let outcome = run(params.with("response_mode", "query")).await;
        assert_eq!(outcome.error_code, "invalid_request");
    }

    #[tokio::test]
    async fn scope_outside_the_catalog_is_rejected_even_when_allowed() {
        let outcome = run(base_with_scope("openid payments")).await;

        assert_eq!(outcome.error_kind, ErrorKind::Client);
        assert_eq!(outcome.error_code, "invalid_scope");
        assert_eq!(
            outcome.error_description.as_deref(),
            Some("scope payments is not supported")
        );
    }

    #[tokio::test]
    async fn known_scope_not_granted_to_client_is_rejected() {
        let outcome = run(base_with_scope("openid phone")).await;

        assert_eq!(outcome.error_code, "invalid_scope");
        assert_eq!(
            outcome.error_description.as_deref(),
            Some("scope phone is not allowed for this client")
        );
    }

    #[tokio::test]
    async fn repeated_parameter_is_rejected() {
        let outcome = run(base().with("scope", "api")).await;
        assert_eq!(outcome.error_code, "invalid_request");
        assert_eq!(outcome.error_kind, ErrorKind::User);
    }

    #[tokio::test]
    async fn explicit_form_post_is_kept() {
        let outcome = run(base().with("response_mode", "form_post")).await;
        assert_eq!(
            outcome.validated_request.unwrap().response_mode,
            ResponseMode::FormPost
        );
    }

    #[test]
    fn response_type_is_order_insensitive() {
        assert_eq!(normalize_response_type("token  id_token"), "id_token token");
        assert_eq!(normalize_response_type("code"), "code");
    }
}
