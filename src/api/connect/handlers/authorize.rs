/*
 * Responsibility
 * - GET|POST /connect/authorize
 * - HTTP リクエスト → AuthorizeHttpRequest / RequestContext に詰め替えて dispatcher に渡す
 * - dispatcher の結果 (405 / error page / 下流の応答) を HTTP レスポンスに変換する
 *
 * Notes
 * - request id は http middleware (x-request-id) が発行済み。ここでは読むだけ
 * - body は POST のときだけ読む (他の method は body を読まずに 405)
 * - UserContext は認証 middleware が extensions に入れていれば使う (無ければ匿名)
 */
use axum::{
    Extension,
    body::Bytes,
    extract::{FromRequest, RawQuery, Request, State},
    http::{HeaderMap, Method, StatusCode, header},
    response::{Html, IntoResponse, Response},
};

use crate::api::connect::views::error_page;
use crate::error::AppError;
use crate::middleware::http::REQUEST_ID_HEADER;
use crate::services::authorize::{
    AuthorizeHttpRequest, AuthorizeResult, RequestContext, UserContext,
};
use crate::state::AppState;

pub async fn authorize(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    user: Option<Extension<UserContext>>,
    request: Request,
) -> Result<Response, AppError> {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let ctx = RequestContext::new(request_id)
        .with_user(user.map(|Extension(u)| u))
        .with_timeout(state.collaborator_timeout);

    let body = if method == Method::POST {
        match Bytes::from_request(request, &state).await {
            Ok(body) => body,
            Err(rejection) => return Ok(rejection.into_response()),
        }
    } else {
        Bytes::new()
    };

    let request = AuthorizeHttpRequest {
        method,
        content_type,
        query,
        body,
    };

    let response = match state.authorize.process(request, &ctx).await? {
        AuthorizeResult::MethodNotAllowed => (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, state.authorize.allowed_methods())],
        )
            .into_response(),
        AuthorizeResult::ErrorPage(model) => {
            (StatusCode::BAD_REQUEST, Html(error_page::render(&model))).into_response()
        }
        AuthorizeResult::Success(response) => response,
    };

    Ok(response)
}
