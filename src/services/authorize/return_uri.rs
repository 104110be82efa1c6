//! Reconstruction of the URI used to send the user back to the client.
//!
//! Only URI and `state` assembly happens here. The error parameters are
//! appended by the projector through [`ReturnUri::with_param`].

use std::fmt;

use url::form_urlencoded;

use super::types::{ResponseMode, ValidatedAuthorizeRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnUri {
    target: String,
    mode: ResponseMode,
    params: Vec<(String, String)>,
}

impl ReturnUri {
    /// `None` when there is no request or no redirect target to echo to.
    pub fn for_request(request: Option<&ValidatedAuthorizeRequest>) -> Option<Self> {
        let request = request?;
        if request.redirect_uri.is_empty() {
            return None;
        }

        // Redirect URIs cannot carry a fragment; drop any so fragment mode owns it.
        let target = match request.redirect_uri.split_once('#') {
            Some((before, _)) => before.to_string(),
            None => request.redirect_uri.clone(),
        };

        let mut params = Vec::new();
        if let Some(state) = request.state.as_deref().filter(|s| !s.is_empty()) {
            params.push(("state".to_string(), state.to_string()));
        }

        Some(Self {
            target,
            mode: request.response_mode,
            params,
        })
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    fn encoded_params(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }

    /// The URI string for this mode.
    ///
    /// For `form_post` this is the bare target; the parameters must be
    /// rendered as form fields by the caller.
    pub fn to_uri_string(&self) -> String {
        if self.params.is_empty() || self.mode == ResponseMode::FormPost {
            return self.target.clone();
        }

        let encoded = self.encoded_params();
        match self.mode {
            ResponseMode::Fragment => format!("{}#{}", self.target, encoded),
            ResponseMode::Query => {
                let separator = match self.target.find('?') {
                    None => "?",
                    Some(_) if self.target.ends_with('?') || self.target.ends_with('&') => "",
                    Some(_) => "&",
                };
                format!("{}{}{}", self.target, separator, encoded)
            }
            ResponseMode::FormPost => self.target.clone(),
        }
    }
}

impl fmt::Display for ReturnUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri_string())
    }
}

/// Pure: same request, same string.
pub fn reconstruct(request: Option<&ValidatedAuthorizeRequest>) -> Option<String> {
    ReturnUri::for_request(request).map(|uri| uri.to_uri_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(redirect_uri: &str, state: Option<&str>, mode: ResponseMode) -> ValidatedAuthorizeRequest {
        let mut req = ValidatedAuthorizeRequest::new("client");
        req.redirect_uri = redirect_uri.to_string();
        req.state = state.map(str::to_string);
        req.response_mode = mode;
        req
    }

    #[test]
    fn fragment_mode_splits_into_base_and_state() {
        let req = request("http://client/callback", Some("123"), ResponseMode::Fragment);
        let uri = reconstruct(Some(&req)).unwrap();

        let parts: Vec<&str> = uri.split('#').collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "http://client/callback");
        assert!(parts[1].contains("state=123"));
    }

    #[test]
    fn query_mode_merges_with_existing_query() {
        let req = request("https://app/cb?tenant=a", Some("xyz"), ResponseMode::Query);
        assert_eq!(
            reconstruct(Some(&req)).as_deref(),
            Some("https://app/cb?tenant=a&state=xyz")
        );

        let req = request("https://app/cb", Some("xyz"), ResponseMode::Query);
        assert_eq!(reconstruct(Some(&req)).as_deref(), Some("https://app/cb?state=xyz"));
    }

    #[test]
    fn state_is_url_encoded_verbatim() {
        let req = request("https://app/cb", Some("a b&c=d"), ResponseMode::Query);
        assert_eq!(
            reconstruct(Some(&req)).as_deref(),
            Some("https://app/cb?state=a+b%26c%3Dd")
        );
    }

    #[test]
    fn missing_redirect_or_request_yields_none() {
        assert_eq!(reconstruct(None), None);
        let req = request("", Some("123"), ResponseMode::Fragment);
        assert_eq!(reconstruct(Some(&req)), None);
    }

    #[test]
    fn no_state_leaves_target_untouched() {
        let req = request("https://app/cb", None, ResponseMode::Fragment);
        assert_eq!(reconstruct(Some(&req)).as_deref(), Some("https://app/cb"));
    }

    #[test]
    fn existing_fragment_is_replaced() {
        let req = request("https://app/cb#old", Some("s"), ResponseMode::Fragment);
        assert_eq!(reconstruct(Some(&req)).as_deref(), Some("https://app/cb#state=s"));
    }

    #[test]
    fn form_post_keeps_params_separate() {
        let req = request("https://app/cb", Some("s1"), ResponseMode::FormPost);
        let uri = ReturnUri::for_request(Some(&req))
            .unwrap()
            .with_param("error", "access_denied");

        assert_eq!(uri.to_uri_string(), "https://app/cb");
        assert_eq!(
            uri.params(),
            &[
                ("state".to_string(), "s1".to_string()),
                ("error".to_string(), "access_denied".to_string()),
            ]
        );
    }

    #[test]
    fn reconstruction_is_deterministic() {
        let req = request("http://client/callback", Some("123"), ResponseMode::Query);
        assert_eq!(reconstruct(Some(&req)), reconstruct(Some(&req)));
    }
}
