use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

/// A kiosk account, keyed by campus admission number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KioskUser {
    #[serde(rename = "admissionNumber")]
    pub admission_number: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub wallet_balance: Decimal,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl KioskUser {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut missing = Vec::new();
        if self.admission_number.trim().is_empty() {
            missing.push("admissionNumber");
        }
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::MissingFields(missing.join(", ")))
        }
    }
}
