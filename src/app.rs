/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (validator / localization / audit sink) → Router 組み立て
 * - Middleware の適用 (request-id / trace / security headers など)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware::{self, http::HttpLimits};
use crate::services::authorize::{AcceptedResponder, AuthorizeEndpoint, AuthorizeOptions};
use crate::services::events::TracingEventSink;
use crate::services::localization::StaticLocalizationService;
use crate::services::scopes::ScopeCatalog;
use crate::services::validation::ClientStoreValidator;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,authorize_gate=debug,audit=info cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing; stderr may be hidden.
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<(), AppError> {
    init_tracing();
    let config = Config::from_env()?;

    // Development: fail fast. Production: keep serving.
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        clients = config.clients.len(),
        allow_form_post = config.allow_form_post,
        "starting authorize endpoint in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config);
    let app = build_router(
        state,
        HttpLimits {
            timeout: config.request_timeout,
            body_limit_bytes: config.request_body_limit_bytes,
        },
    );

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, addr = %config.addr, "failed to bind");
            AppError::Internal
        })?;
    axum::serve(listener, app).await.map_err(|err| {
        tracing::error!(error = %err, "server error");
        AppError::Internal
    })?;

    Ok(())
}

/// Wire the process-level collaborators into the endpoint.
pub fn build_state(config: &Config) -> AppState {
    let scopes = Arc::new(ScopeCatalog::standard());

    let endpoint = AuthorizeEndpoint::new(
        Arc::new(ClientStoreValidator::new(
            config.clients.clone(),
            Arc::clone(&scopes),
        )),
        Arc::new(StaticLocalizationService::new()),
        Arc::new(TracingEventSink::new()),
        Arc::new(AcceptedResponder::new(scopes)),
        AuthorizeOptions {
            allow_form_post: config.allow_form_post,
        },
    );

    AppState::new(Arc::new(endpoint), Some(config.collaborator_timeout))
}

pub fn build_router(state: AppState, limits: HttpLimits) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes())
        .merge(api::connect::routes(limits.body_limit_bytes))
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router, limits)
}
