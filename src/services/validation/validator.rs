use async_trait::async_trait;

use crate::services::authorize::{AuthorizeParameters, UserContext, ValidationOutcome};

/// Faults of the validator itself.
///
/// An invalid request is not a fault: it is a `ValidationOutcome` with
/// `is_error() == true`.
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    #[error("validator backend unavailable: {0}")]
    Unavailable(String),

    #[error("validator failed: {0}")]
    Internal(String),
}

#[async_trait]
pub trait AuthorizeRequestValidator: Send + Sync {
    /// Must not mutate its inputs. On failure, fills `validated_request`
    /// with whatever it resolved so the caller can echo back.
    async fn validate(
        &self,
        parameters: &AuthorizeParameters,
        user: Option<&UserContext>,
    ) -> Result<ValidationOutcome, ValidatorError>;
}
