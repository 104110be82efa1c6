/*
 * Responsibility
 * - authorize endpoint の入出力の型 (契約)
 * - Validator → Projector → Emitter の間で受け渡す値はここに固定する
 *
 * Notes
 * - プロトコルエラーは「値」(ValidationOutcome) として扱い、Err にはしない
 * - Err になるのは Validator 自体の故障など、ローカルで回復できないものだけ
 */
use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Endpoint name reported in audit events.
pub const AUTHORIZE_ENDPOINT_NAME: &str = "Authorize";

/// Code used when an erroring outcome arrives without one.
pub const FALLBACK_ERROR_CODE: &str = "server_error";

/// Who the failure is attributable to.
///
/// `User` and `Client` currently render the same page; the split is kept
/// as a classification signal for auditing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    None,
    User,
    Client,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::None => write!(f, "none"),
            ErrorKind::User => write!(f, "user"),
            ErrorKind::Client => write!(f, "client"),
        }
    }
}

/// How result parameters travel back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    Query,
    Fragment,
    FormPost,
}

impl ResponseMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "query" => Some(Self::Query),
            "fragment" => Some(Self::Fragment),
            "form_post" => Some(Self::FormPost),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::Query => "query",
            ResponseMode::Fragment => "fragment",
            ResponseMode::FormPost => "form_post",
        }
    }
}

/// The parsed request, or as much of it as the validator could resolve.
///
/// An empty `redirect_uri` means no verified echo target exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedAuthorizeRequest {
    pub client_id: String,
    pub client_name: Option<String>,
    pub redirect_uri: String,
    pub state: Option<String>,
    pub response_mode: ResponseMode,
    pub response_type: Option<String>,
    pub requested_scopes: Vec<String>,
    pub nonce: Option<String>,
    pub subject: Option<String>,
}

impl ValidatedAuthorizeRequest {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_name: None,
            redirect_uri: String::new(),
            state: None,
            response_mode: ResponseMode::Query,
            response_type: None,
            requested_scopes: Vec::new(),
            nonce: None,
            subject: None,
        }
    }
}

/// Result of validating one request. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub error_kind: ErrorKind,
    pub error_code: String,
    pub error_description: Option<String>,
    pub validated_request: Option<ValidatedAuthorizeRequest>,
}

impl ValidationOutcome {
    pub fn success(request: ValidatedAuthorizeRequest) -> Self {
        Self {
            error_kind: ErrorKind::None,
            error_code: String::new(),
            error_description: None,
            validated_request: Some(request),
        }
    }

    pub fn user_error(
        code: impl Into<String>,
        request: Option<ValidatedAuthorizeRequest>,
    ) -> Self {
        Self::error(ErrorKind::User, code, request)
    }

    pub fn client_error(
        code: impl Into<String>,
        request: Option<ValidatedAuthorizeRequest>,
    ) -> Self {
        Self::error(ErrorKind::Client, code, request)
    }

    fn error(
        kind: ErrorKind,
        code: impl Into<String>,
        request: Option<ValidatedAuthorizeRequest>,
    ) -> Self {
        Self {
            error_kind: kind,
            error_code: code.into(),
            error_description: None,
            validated_request: request,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.error_description = Some(description.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.error_kind != ErrorKind::None
    }

    /// The code as it should be reported; never empty for an error.
    pub fn effective_error_code(&self) -> &str {
        if self.error_code.is_empty() {
            FALLBACK_ERROR_CODE
        } else {
            &self.error_code
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnInfo {
    pub client_id: String,
    pub client_name: Option<String>,
    pub uri: String,
    pub response_mode: ResponseMode,
    /// Hidden fields for `form_post`; empty for the other modes.
    pub form_fields: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponseModel {
    pub request_id: String,
    pub error_code: String,
    pub error_message: String,
    pub return_info: Option<ReturnInfo>,
}

/// Authenticated end user, if the session carries one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub subject: String,
}

impl UserContext {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }
}

/// Request-scoped values threaded explicitly through the pipeline.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Assigned upstream (x-request-id); passed through unchanged.
    pub request_id: String,
    pub user: Option<UserContext>,
    /// Upper bound for each collaborator call.
    pub collaborator_timeout: Option<Duration>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            user: None,
            collaborator_timeout: None,
        }
    }

    pub fn with_user(mut self, user: Option<UserContext>) -> Self {
        self.user = user;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.collaborator_timeout = timeout;
        self
    }
}

/// Name/value pairs from the query string or form body, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizeParameters {
    pairs: Vec<(String, String)>,
}

impl AuthorizeParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(encoded: &[u8]) -> Self {
        let pairs = url::form_urlencoded::parse(encoded)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((name.into(), value.into()));
        self
    }

    /// First value for `name`. Empty values count as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn count(&self, name: &str) -> usize {
        self.pairs.iter().filter(|(k, _)| k == name).count()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
