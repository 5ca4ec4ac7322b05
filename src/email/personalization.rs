//! DKIM credential injection into send payloads.
//!
//! The payload is kept as a [`serde_json::Value`] so that fields this service
//! does not know about reach the upstream untouched.

use serde_json::{Map, Value};

use crate::config::Credentials;

pub const DKIM_DOMAIN: &str = "dkim_domain";
pub const DKIM_PRIVATE_KEY: &str = "dkim_private_key";
pub const DKIM_SELECTOR: &str = "dkim_selector";

/// Selector value injected into every personalization.
pub const SELECTOR: &str = "mailchannels";

const PERSONALIZATIONS: &str = "personalizations";

/// Why an inbound send payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("body is not valid JSON: {0}")]
    Json(String),
    #[error("body must be a JSON object")]
    NotAnObject,
    #[error("missing 'personalizations' array")]
    MissingPersonalizations,
    #[error("personalization {0} is not a JSON object")]
    InvalidPersonalization(usize),
}

/// Parse raw request bytes into a send payload object.
pub fn parse_payload(body: &[u8]) -> Result<Map<String, Value>, PayloadError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(payload)) => Ok(payload),
        Ok(_) => Err(PayloadError::NotAnObject),
        Err(e) => Err(PayloadError::Json(e.to_string())),
    }
}

/// Merge the signing fields into every personalization.
///
/// The selector is always [`SELECTOR`]; domain and key come from `credentials`.
///
/// Existing keys are kept; the three DKIM keys are overwritten when present.
/// Applying this twice yields the same payload as applying it once.
pub fn apply_dkim(
    payload: &mut Map<String, Value>,
    credentials: &Credentials,
) -> Result<(), PayloadError> {
    let personalizations = payload
        .get_mut(PERSONALIZATIONS)
        .and_then(Value::as_array_mut)
        .ok_or(PayloadError::MissingPersonalizations)?;

    for (index, personalization) in personalizations.iter_mut().enumerate() {
        let fields = personalization
            .as_object_mut()
            .ok_or(PayloadError::InvalidPersonalization(index))?;
        fields.insert(
            DKIM_DOMAIN.to_string(),
            Value::String(credentials.dkim_domain.clone()),
        );
        fields.insert(
            DKIM_PRIVATE_KEY.to_string(),
            Value::String(credentials.dkim_private_key.clone()),
        );
        fields.insert(
            DKIM_SELECTOR.to_string(),
            Value::String(SELECTOR.to_string()),
        );
    }

    Ok(())
}
