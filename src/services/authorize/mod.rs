/*!
 * Authorize endpoint core
 *
 * Responsibility:
 * - method gate → Validator → Projector → Audit Emitter の順序を保証する
 * - HTTP / axum の詳細は api 層に置き、ここは request-scoped な値だけを扱う
 *
 * Public API:
 * - AuthorizeEndpoint (dispatcher)
 * - ErrorResponseProjector / AuditEmitter / reconstruct
 * - 入出力の型 (types)
 */

mod emitter;
mod endpoint;
mod projector;
mod responder;
mod return_uri;
mod types;

pub use emitter::AuditEmitter;
pub use endpoint::{
    AuthorizeEndpoint, AuthorizeError, AuthorizeHttpRequest, AuthorizeOptions, AuthorizeResult,
};
pub use projector::ErrorResponseProjector;
pub use responder::{AcceptedResponder, AuthorizeResponder};
pub use return_uri::{ReturnUri, reconstruct};
pub use types::{
    AUTHORIZE_ENDPOINT_NAME, AuthorizeParameters, ErrorKind, ErrorResponseModel,
    FALLBACK_ERROR_CODE, RequestContext, ResponseMode, ReturnInfo, UserContext,
    ValidatedAuthorizeRequest, ValidationOutcome,
};
