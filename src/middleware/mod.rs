/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - request-id / trace / timeout / body limit / security headers
 */
pub mod http;
pub mod security_headers;
