//! Authorize endpoint dispatcher.
//!
//! Order within one request is fixed: method gate → validate → project →
//! emit. Protocol failures are data (`ValidationOutcome`); only faults of the
//! validator itself come back as `Err`.
//!
//! Projection and emission of a failure share one spawned task, so dropping
//! the request future after validation still gets the audit event out.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::Method;
use axum::response::Response;
use tracing::{info, warn};

use super::emitter::AuditEmitter;
use super::projector::ErrorResponseProjector;
use super::responder::AuthorizeResponder;
use super::types::{
    AUTHORIZE_ENDPOINT_NAME, AuthorizeParameters, ErrorResponseModel, RequestContext,
    ValidationOutcome,
};
use crate::services::events::EventSink;
use crate::services::localization::LocalizationService;
use crate::services::validation::{AuthorizeRequestValidator, ValidatorError};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, thiserror::Error)]
pub enum AuthorizeError {
    #[error(transparent)]
    Validator(#[from] ValidatorError),

    #[error("request validation timed out")]
    ValidatorTimedOut,

    #[error("validator reported success without a validated request")]
    IncompleteOutcome,

    #[error("error response task did not complete: {0}")]
    ErrorTask(#[source] tokio::task::JoinError),
}

/// The complete output alphabet of the endpoint.
#[derive(Debug)]
pub enum AuthorizeResult {
    MethodNotAllowed,
    ErrorPage(ErrorResponseModel),
    Success(Response),
}

/// Transport-level view of the inbound request.
#[derive(Debug, Clone)]
pub struct AuthorizeHttpRequest {
    pub method: Method,
    pub content_type: Option<String>,
    pub query: Option<String>,
    pub body: Bytes,
}

impl AuthorizeHttpRequest {
    pub fn get(query: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            content_type: None,
            query: Some(query.into()),
            body: Bytes::new(),
        }
    }

    pub fn form_post(body: impl Into<Bytes>) -> Self {
        Self {
            method: Method::POST,
            content_type: Some(FORM_CONTENT_TYPE.to_string()),
            query: None,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AuthorizeOptions {
    /// When false only the GET read form is accepted.
    pub allow_form_post: bool,
}

impl Default for AuthorizeOptions {
    fn default() -> Self {
        Self {
            allow_form_post: true,
        }
    }
}

pub struct AuthorizeEndpoint {
    validator: Arc<dyn AuthorizeRequestValidator>,
    projector: ErrorResponseProjector,
    emitter: AuditEmitter,
    responder: Arc<dyn AuthorizeResponder>,
    options: AuthorizeOptions,
}

impl AuthorizeEndpoint {
    pub fn new(
        validator: Arc<dyn AuthorizeRequestValidator>,
        localization: Arc<dyn LocalizationService>,
        events: Arc<dyn EventSink>,
        responder: Arc<dyn AuthorizeResponder>,
        options: AuthorizeOptions,
    ) -> Self {
        Self {
            validator,
            projector: ErrorResponseProjector::new(localization),
            emitter: AuditEmitter::new(events),
            responder,
            options,
        }
    }

    pub async fn process(
        &self,
        request: AuthorizeHttpRequest,
        ctx: &RequestContext,
    ) -> Result<AuthorizeResult, AuthorizeError> {
        let Some(parameters) = self.extract_parameters(&request) else {
            info!(
                method = %request.method,
                request_id = %ctx.request_id,
                "authorize request rejected: method not allowed"
            );
            return Ok(AuthorizeResult::MethodNotAllowed);
        };

        self.process_request(parameters, ctx).await
    }

    /// Runs the pipeline on already-extracted parameters.
    pub async fn process_request(
        &self,
        parameters: AuthorizeParameters,
        ctx: &RequestContext,
    ) -> Result<AuthorizeResult, AuthorizeError> {
        let outcome = self.validate(&parameters, ctx).await?;

        if !outcome.is_error() {
            let request = outcome
                .validated_request
                .ok_or(AuthorizeError::IncompleteOutcome)?;
            return Ok(AuthorizeResult::Success(
                self.responder.respond(request, ctx).await,
            ));
        }

        info!(
            error = %outcome.effective_error_code(),
            kind = %outcome.error_kind,
            request_id = %ctx.request_id,
            "authorize request validation failed"
        );

        let projector = self.projector.clone();
        let emitter = self.emitter.clone();
        let ctx = ctx.clone();
        let task = tokio::spawn(async move {
            let model = projector
                .project(&outcome, &ctx.request_id, ctx.collaborator_timeout)
                .await;
            emitter.emit(&outcome, AUTHORIZE_ENDPOINT_NAME, &ctx).await;
            model
        });

        let model = task.await.map_err(AuthorizeError::ErrorTask)?;
        Ok(AuthorizeResult::ErrorPage(model))
    }

    /// Value for the `Allow` header of a 405.
    pub fn allowed_methods(&self) -> &'static str {
        if self.options.allow_form_post {
            "GET, POST"
        } else {
            "GET"
        }
    }

    async fn validate(
        &self,
        parameters: &AuthorizeParameters,
        ctx: &RequestContext,
    ) -> Result<ValidationOutcome, AuthorizeError> {
        let validation = self.validator.validate(parameters, ctx.user.as_ref());
        let outcome = match ctx.collaborator_timeout {
            Some(limit) => tokio::time::timeout(limit, validation)
                .await
                .map_err(|_| AuthorizeError::ValidatorTimedOut)?,
            None => validation.await,
        };

        outcome.map_err(|err| {
            warn!(error = ?err, request_id = %ctx.request_id, "request validator failed");
            AuthorizeError::from(err)
        })
    }

    fn extract_parameters(&self, request: &AuthorizeHttpRequest) -> Option<AuthorizeParameters> {
        if request.method == Method::GET {
            let query = request.query.as_deref().unwrap_or_default();
            return Some(AuthorizeParameters::parse(query.as_bytes()));
        }

        if request.method == Method::POST
            && self.options.allow_form_post
            && is_form_content_type(request.content_type.as_deref())
        {
            return Some(AuthorizeParameters::parse(&request.body));
        }

        None
    }
}

fn is_form_content_type(value: Option<&str>) -> bool {
    value
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}
