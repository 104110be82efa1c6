/*!
 * Authorize request validation
 *
 * Responsibility:
 * - Validator の境界 (trait) を定義する
 * - 起動用の組み込み実装 (登録済みクライアントに対する検証) を提供する
 *
 * Public API:
 * - AuthorizeRequestValidator / ValidatorError
 * - ClientStoreValidator / ClientStore / RegisteredClient
 */

mod client_store;
mod validator;

pub use client_store::{ClientStore, ClientStoreValidator, RegisteredClient};
pub use validator::{AuthorizeRequestValidator, ValidatorError};
