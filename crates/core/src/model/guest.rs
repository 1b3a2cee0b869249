use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ExamId, SessionId, StudentId};

/// Storage key under which the guest record lives in client-local storage.
pub const GUEST_SESSION_KEY: &str = "quizya.guest_session";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GuestSessionError {
    #[error("guest name cannot be empty")]
    EmptyName,

    #[error("guest email is invalid: {0}")]
    InvalidEmail(String),
}

/// Ephemeral record identifying an anonymous exam-taker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestSessionData {
    pub session_id: String,
    pub exam_id: String,
    pub guest_name: String,
    pub guest_email: String,
    pub is_guest: bool,
}

impl GuestSessionData {
    /// Parse a stored record, yielding `None` for anything that is not a
    /// well-formed guest record with `isGuest: true`.
    #[must_use]
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str::<Self>(raw)
            .ok()
            .filter(|data| data.is_guest)
    }

    /// Serialize for storage.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Unvalidated guest details from the exam entry form.
#[derive(Clone, Debug, Default)]
pub struct GuestDraft {
    pub name: String,
    pub email: String,
}

impl GuestDraft {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Validate and normalize the draft into a guest record for `exam_id`.
    ///
    /// # Errors
    ///
    /// Returns `GuestSessionError` if the name is blank or the email is not
    /// of the form `local@domain`.
    pub fn validate(
        self,
        session_id: SessionId,
        exam_id: ExamId,
    ) -> Result<GuestSessionData, GuestSessionError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(GuestSessionError::EmptyName);
        }

        let email = self.email.trim().to_lowercase();
        let valid_email = email
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            });
        if !valid_email {
            return Err(GuestSessionError::InvalidEmail(self.email));
        }

        Ok(GuestSessionData {
            session_id: session_id.to_string(),
            exam_id: exam_id.to_string(),
            guest_name: name.to_string(),
            guest_email: email,
            is_guest: true,
        })
    }
}

/// Who a submission is attributed to. Empty when neither is known.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentifier {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub student_id: Option<StudentId>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub guest_email: Option<String>,
}

impl SessionIdentifier {
    #[must_use]
    pub fn guest(email: impl Into<String>) -> Self {
        Self {
            student_id: None,
            guest_email: Some(email.into()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.student_id.is_none() && self.guest_email.is_none()
    }
}
