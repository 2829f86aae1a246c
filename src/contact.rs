//! Contact form submissions.
//!
//! `POST /api/contact` takes `{ name, email, message }`. The only check is
//! presence: each field must be a non-empty string. No format validation,
//! no persistence; an accepted message is written to the log.
//!
//! | Body | Status | Response |
//! |------|--------|----------|
//! | all three fields non-empty strings | 200 | `{"success":true}` |
//! | anything else (missing, empty, null, non-string, not JSON) | 400 | `{"error":"All fields required"}` |

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Fixed rejection message.
pub const FIELDS_REQUIRED: &str = "All fields required";

/// Status line the contact page shows after a successful submission.
pub const STATUS_SENT: &str = "Message sent!";

/// Status line for a rejected submission or a transport failure. The visitor
/// may resubmit by hand; nothing retries automatically.
pub const STATUS_FAILED: &str = "Error sending message.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("All fields required")]
    MissingFields,
}

/// One submission. Lives for the duration of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    /// Presence-check a decoded JSON body.
    pub fn from_json(body: &Value) -> Result<Self, ContactError> {
        let field = |name: &str| -> Result<String, ContactError> {
            match body.get(name).and_then(Value::as_str) {
                Some(value) if !value.is_empty() => Ok(value.to_string()),
                _ => Err(ContactError::MissingFields),
            }
        };

        Ok(Self {
            name: field("name")?,
            email: field("email")?,
            message: field("message")?,
        })
    }

    /// Presence-check a raw request body. Bodies that aren't JSON are
    /// treated like bodies with no fields.
    pub fn from_body(bytes: &[u8]) -> Result<Self, ContactError> {
        let body: Value = serde_json::from_slice(bytes).map_err(|_| ContactError::MissingFields)?;
        Self::from_json(&body)
    }
}

/// Outcome of one submission, ready to be written as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ContactReply {
    Accepted { success: bool },
    Rejected { error: &'static str },
}

impl ContactReply {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Accepted { .. } => 200,
            Self::Rejected { .. } => 400,
        }
    }
}

/// Validate, log, and answer one submission.
pub fn submit(bytes: &[u8]) -> ContactReply {
    match ContactMessage::from_body(bytes) {
        Ok(msg) => {
            tracing::info!(
                name = %msg.name,
                email = %msg.email,
                message = %msg.message,
                "contact form submitted"
            );
            ContactReply::Accepted { success: true }
        }
        Err(e) => {
            tracing::debug!(error = %e, "contact form rejected");
            ContactReply::Rejected {
                error: FIELDS_REQUIRED,
            }
        }
    }
}
