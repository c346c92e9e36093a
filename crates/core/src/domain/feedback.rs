use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: String,
    pub name: String,
    #[serde(rename = "admissionNumber")]
    pub admission_number: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Incoming feedback form. Every field is required.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct FeedbackSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "admissionNumber", default)]
    pub admission_number: String,
    #[serde(default)]
    pub message: String,
}

impl FeedbackSubmission {
    pub fn into_feedback(
        self,
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Feedback, DomainError> {
        if self.name.trim().is_empty()
            || self.admission_number.trim().is_empty()
            || self.message.trim().is_empty()
        {
            return Err(DomainError::MissingFields(
                "name, admissionNumber, message".to_string(),
            ));
        }

        Ok(Feedback {
            id: id.into(),
            name: self.name,
            admission_number: self.admission_number,
            message: self.message,
            timestamp,
        })
    }
}
