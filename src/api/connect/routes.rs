/*
 * Responsibility
 * - /connect/authorize の配線
 * - method の可否は dispatcher が判断するので POST 以外は fallback で同じ handler に流す
 * - body を読むのは POST だけなので body limit も POST にだけ掛ける
 */
use axum::{Router, handler::Handler, routing::post};
use tower_http::limit::RequestBodyLimitLayer;

use crate::api::connect::handlers::authorize::authorize;
use crate::state::AppState;

pub const AUTHORIZE_PATH: &str = "/connect/authorize";

pub fn routes(body_limit_bytes: usize) -> Router<AppState> {
    Router::new().route(
        AUTHORIZE_PATH,
        post(authorize.layer(RequestBodyLimitLayer::new(body_limit_bytes))).fallback(authorize),
    )
}
