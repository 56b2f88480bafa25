//! Request and response bodies.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Signup body; every field is optional and unvalidated.
///
/// Fields accept any JSON value: strings are taken as-is, `null` counts as
/// absent and anything else is kept as its JSON text.
#[derive(ToSchema, Serialize, Deserialize)]
pub struct SignupRequest {
    #[serde(default, deserialize_with = "any_as_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "any_as_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "any_as_text")]
    pub password: Option<String>,
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResendOtpRequest {
    #[serde(default, deserialize_with = "any_as_text")]
    pub email: Option<String>,
}

fn any_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub message: String,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signup_request_accepts_any_json_value() -> serde_json::Result<()> {
        let request: SignupRequest = serde_json::from_value(json!({
            "email": "a@x.com",
            "name": 5,
            "password": {"nested": [true]}
        }))?;

        assert_eq!(request.email.as_deref(), Some("a@x.com"));
        assert_eq!(request.name.as_deref(), Some("5"));
        assert_eq!(request.password.as_deref(), Some(r#"{"nested":[true]}"#));
        Ok(())
    }

    #[test]
    fn null_and_missing_fields_are_absent() -> serde_json::Result<()> {
        let request: SignupRequest = serde_json::from_value(json!({"name": null}))?;

        assert_eq!(request.email, None);
        assert_eq!(request.name, None);
        assert_eq!(request.password, None);
        Ok(())
    }

    #[test]
    fn resend_request_email_may_be_a_number() -> serde_json::Result<()> {
        let request: ResendOtpRequest = serde_json::from_value(json!({"email": 42}))?;
        assert_eq!(request.email.as_deref(), Some("42"));
        Ok(())
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(serde_json::from_value::<SignupRequest>(json!("a@x.com")).is_err());
    }
}
