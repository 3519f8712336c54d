//! Order submission: contact validation, the payment stub, and order
//! reference generation.

use rand::Rng;
use rupite_greens_core::Email;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stubbed payment choice recorded on the order; no processor behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Card,
    Cash,
}

/// Raw submit form as posted by the client. Every field defaults so
/// validation can list all gaps in one pass instead of failing at
/// deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
    pub terms_accepted: bool,
}

/// Validated contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// Required fields are blank or unusable; `missing` carries their wire
    /// names.
    #[error("order validation failed: missing {}", missing.join(", "))]
    Invalid { missing: Vec<&'static str> },
}

impl OrderForm {
    /// Validate into contact details, collecting every missing or invalid
    /// field rather than stopping at the first.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Invalid`] naming all offending fields.
    pub fn validate(&self) -> Result<ContactInfo, OrderError> {
        let mut missing = Vec::new();

        let first_name = self.first_name.trim();
        if first_name.is_empty() {
            missing.push("firstName");
        }
        let last_name = self.last_name.trim();
        if last_name.is_empty() {
            missing.push("lastName");
        }
        let email = match Email::parse(self.email.trim()) {
            Ok(email) => Some(email),
            Err(_) => {
                missing.push("email");
                None
            }
        };
        let phone = self.phone.trim();
        if phone.is_empty() {
            missing.push("phone");
        }
        if !self.terms_accepted {
            missing.push("termsAccepted");
        }

        match (email, missing.is_empty()) {
            (Some(email), true) => Ok(ContactInfo {
                first_name: first_name.to_owned(),
                last_name: last_name.to_owned(),
                email,
                phone: phone.to_owned(),
            }),
            _ => Err(OrderError::Invalid { missing }),
        }
    }
}

/// What the customer gets back after a successful submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_number: String,
    pub item_count: u32,
    pub merchandise_total: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
}

const REFERENCE_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const REFERENCE_LEN: usize = 9;

/// Generate an opaque order reference: `"RG"` plus nine characters from
/// `[0-9A-Z]`. Uniqueness is not guaranteed across runs.
#[must_use]
pub fn generate_reference() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..REFERENCE_LEN)
        .map(|_| {
            let index = rng.random_range(0..REFERENCE_CHARSET.len());
            char::from(REFERENCE_CHARSET.get(index).copied().unwrap_or(b'0'))
        })
        .collect();
    format!("RG{suffix}")
}
