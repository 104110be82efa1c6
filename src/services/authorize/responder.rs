/*
 * Responsibility
 * - 検証成功後の下流処理 (consent / token 発行など) への境界
 * - AcceptedResponder はスタンドアロン起動用: 受理したリクエストを JSON で返すだけ
 */
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::types::{RequestContext, ValidatedAuthorizeRequest};
use crate::services::scopes::ScopeCatalog;

#[async_trait]
pub trait AuthorizeResponder: Send + Sync {
    async fn respond(&self, request: ValidatedAuthorizeRequest, ctx: &RequestContext) -> Response;
}

#[derive(Debug, Serialize)]
struct AcceptedBody {
    request_id: String,
    client_id: String,
    client_name: Option<String>,
    subject: Option<String>,
    response_mode: &'static str,
    scopes: Vec<ScopeBody>,
}

#[derive(Debug, Serialize)]
struct ScopeBody {
    name: String,
    display_name: Option<&'static str>,
    description: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct AcceptedResponder {
    scopes: Arc<ScopeCatalog>,
}

impl AcceptedResponder {
    pub fn new(scopes: Arc<ScopeCatalog>) -> Self {
        Self { scopes }
    }
}

#[async_trait]
impl AuthorizeResponder for AcceptedResponder {
    async fn respond(&self, request: ValidatedAuthorizeRequest, ctx: &RequestContext) -> Response {
        let scopes = request
            .requested_scopes
            .iter()
            .map(|name| {
                let display = self.scopes.lookup(name);
                ScopeBody {
                    name: name.clone(),
                    display_name: display.map(|d| d.display_name),
                    description: display.and_then(|d| d.description),
                }
            })
            .collect();

        let body = AcceptedBody {
            request_id: ctx.request_id.clone(),
            client_id: request.client_id,
            client_name: request.client_name,
            subject: request.subject,
            response_mode: request.response_mode.as_str(),
            scopes,
        };

        (StatusCode::OK, Json(body)).into_response()
    }
}
