//! HTTP handler surface for key publication.
//!
//! Routing belongs to the embedding service; the handler here only calls
//! the key-set publisher and serializes the result. Assertion creation has
//! no HTTP surface — it is invoked in-process by the component driving the
//! federated-login call.

use error_stack::{Report, ResultExt};
use http::{header, Response, StatusCode};

use crate::error::AssertionBrokerError;
use crate::jwks::KeySetPublisher;

/// Conventional mount point for the key-set document.
pub const KEY_SET_PATH: &str = "/auth/jwks";

/// Returns the key-set document as an `application/json` response.
///
/// # Errors
///
/// Returns a `Configuration` error if the key set cannot be serialized.
pub fn handle_key_set(
    publisher: &KeySetPublisher,
) -> Result<Response<String>, Report<AssertionBrokerError>> {
    let body = serde_json::to_string(publisher.key_set()).change_context(
        AssertionBrokerError::Configuration {
            message: "Failed to serialize key set".into(),
        },
    )?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .change_context(AssertionBrokerError::Configuration {
            message: "Failed to build key set response".into(),
        })
}

/// Converts a broker error into the 5xx response the caller receives.
///
/// Both error contexts are request-fatal with no partial output, so they
/// map uniformly to an internal server error.
pub fn to_error_response(err: &Report<AssertionBrokerError>) -> Response<String> {
    log::error!("Request failed: {err:?}");

    let body = serde_json::json!({ "error": err.current_context().to_string() }).to_string();

    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .expect("static response parts are valid")
}
