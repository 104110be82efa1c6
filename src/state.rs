/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - Clone 前提で持つ (内部は Arc)
 * - リクエスト間で共有する可変状態は持たない
 */
use std::sync::Arc;
use std::time::Duration;

use crate::services::authorize::AuthorizeEndpoint;

#[derive(Clone)]
pub struct AppState {
    pub authorize: Arc<AuthorizeEndpoint>,
    pub collaborator_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(authorize: Arc<AuthorizeEndpoint>, collaborator_timeout: Option<Duration>) -> Self {
        Self {
            authorize,
            collaborator_timeout,
        }
    }
}
