//! Conversion of `ureq` failures into [`ApiError`].

use dealsync_core::ApiError;

use crate::wire::error_message;

/// Map a failed request. Non-2xx responses keep their status; the message is
/// the first JSON:API error detail, else the raw body, else the status text.
pub(crate) fn from_ureq(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(status, response) => {
            let status_text = response.status_text().to_owned();
            let body = response.into_string().unwrap_or_default();
            let message = error_message(&body)
                .or_else(|| non_empty(body.trim()))
                .unwrap_or(status_text);
            ApiError::Status { status, message }
        }
        ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
    }
}

pub(crate) fn decode_err(what: &str, err: impl std::fmt::Display) -> ApiError {
    ApiError::Decode(format!("{what}: {err}"))
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_owned())
}
