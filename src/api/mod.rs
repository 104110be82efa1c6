/*
 * Responsibility
 * - HTTP 層の公開ポイント
 * - connect: OAuth2 / OIDC プロトコルエンドポイント (/connect/authorize)
 * - v1: 運用系 API (/api/v1/health)
 */
pub mod connect;
pub mod v1;
