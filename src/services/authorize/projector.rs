//! Projection of a failed validation into the error page model.
//!
//! No hidden state: the same outcome and request id always produce the same
//! model, as long as the localization backend answers the same way.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::return_uri::ReturnUri;
use super::types::{ErrorResponseModel, ResponseMode, ReturnInfo, ValidationOutcome};
use crate::services::localization::LocalizationService;

#[derive(Clone)]
pub struct ErrorResponseProjector {
    localization: Arc<dyn LocalizationService>,
}

impl ErrorResponseProjector {
    pub fn new(localization: Arc<dyn LocalizationService>) -> Self {
        Self { localization }
    }

    pub async fn project(
        &self,
        outcome: &ValidationOutcome,
        request_id: &str,
        timeout: Option<Duration>,
    ) -> ErrorResponseModel {
        let error_code = outcome.effective_error_code().to_string();
        let error_message = self
            .localize(&error_code, timeout)
            .await
            .unwrap_or_else(|| error_code.clone());

        ErrorResponseModel {
            request_id: request_id.to_string(),
            error_code: error_code.clone(),
            error_message,
            return_info: return_info(outcome, &error_code),
        }
    }

    async fn localize(&self, code: &str, timeout: Option<Duration>) -> Option<String> {
        let lookup = self.localization.resolve(code);
        let resolved = match timeout {
            Some(limit) => match tokio::time::timeout(limit, lookup).await {
                Ok(resolved) => resolved,
                Err(_) => {
                    warn!(code, "localization lookup timed out");
                    None
                }
            },
            None => lookup.await,
        };
        resolved.filter(|text| !text.trim().is_empty())
    }
}

fn return_info(outcome: &ValidationOutcome, error_code: &str) -> Option<ReturnInfo> {
    let request = outcome.validated_request.as_ref()?;
    let mut uri = ReturnUri::for_request(Some(request))?.with_param("error", error_code);
    if let Some(description) = outcome.error_description.as_deref() {
        uri = uri.with_param("error_description", description);
    }

    let form_fields = match uri.mode() {
        ResponseMode::FormPost => uri.params().to_vec(),
        _ => Vec::new(),
    };

    Some(ReturnInfo {
        client_id: request.client_id.clone(),
        client_name: request.client_name.clone(),
        uri: uri.to_uri_string(),
        response_mode: uri.mode(),
        form_fields,
    })
}
