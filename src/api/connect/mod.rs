/*
 * Responsibility
 * - プロトコルエンドポイント (/connect/...) の公開ポイント
 */
pub mod handlers;
mod routes;
pub mod views;

pub use routes::{AUTHORIZE_PATH, routes};
