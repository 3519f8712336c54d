//! Checkout state machine.
//!
//! One attempt walks `Method -> {Address | Office} -> Summary`; submission
//! is a separate one-shot action from `Summary`. The attempt is transient
//! and never persisted. Completing a detail step prices the delivery over
//! the courier adapter; the token/in-flight pair below guards that call so
//! the session lock is never held across it.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use rupite_greens_core::{CityId, OfficeId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::econt::types::{City, Office};

// ====== Vocabulary ======

/// How the customer wants the order handed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Door,
    Office,
}

/// Where a checkout attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    Method,
    Address,
    Office,
    Summary,
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Method => "method",
            Self::Address => "address",
            Self::Office => "office",
            Self::Summary => "summary",
        };
        write!(f, "{name}")
    }
}

/// Checkout transition and validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("no checkout in progress")]
    NotStarted,

    #[error("not available on the {0} step")]
    WrongStep(CheckoutStep),

    #[error("a delivery pricing request is already running")]
    PricingInFlight,

    #[error("street is required")]
    MissingStreet,

    #[error("unknown city: {0}")]
    UnknownCity(CityId),

    #[error("no offices available in city {0}")]
    NoOffices(CityId),

    #[error("office {office} is not in city {city}")]
    OfficeNotInCity { office: OfficeId, city: CityId },
}

// ====== Delivery quote ======

/// Street destination for door delivery. Blank optional fields collapse to
/// `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreetAddress {
    pub street: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl StreetAddress {
    /// Build from raw form fields. The street must be non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingStreet`] when the street trims to
    /// nothing.
    pub fn parse(
        street: &str,
        quarter: Option<String>,
        notes: Option<String>,
    ) -> Result<Self, CheckoutError> {
        let street = street.trim();
        if street.is_empty() {
            return Err(CheckoutError::MissingStreet);
        }
        Ok(Self {
            street: street.to_owned(),
            quarter: none_if_blank(quarter),
            notes: none_if_blank(notes),
        })
    }
}

fn none_if_blank(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// The destination half of a quote. The serde tag keeps the door and
/// office forms mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum DeliveryDestination {
    Door { city: City, address: StreetAddress },
    Office { city: City, office: Office },
}

impl DeliveryDestination {
    #[must_use]
    pub const fn method(&self) -> DeliveryMethod {
        match self {
            Self::Door { .. } => DeliveryMethod::Door,
            Self::Office { .. } => DeliveryMethod::Office,
        }
    }
}

/// A priced delivery choice. Stored on the session once a detail step
/// completes, replaced wholesale on edit, discarded when the cart clears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryQuote {
    pub price: Decimal,
    pub currency: String,
    /// Deadline in days from pickup.
    pub deadline: u32,
    pub pickup_date: NaiveDate,
    pub delivery_date: NaiveDate,
    #[serde(default)]
    pub saturday_delivery: bool,
    #[serde(flatten)]
    pub destination: DeliveryDestination,
}

impl DeliveryQuote {
    #[must_use]
    pub const fn method(&self) -> DeliveryMethod {
        self.destination.method()
    }
}

// ====== Attempt state ======

/// A single checkout attempt.
///
/// The token changes on every transition and a pricing result is applied
/// only when the token captured at dispatch still matches, so a result
/// arriving after back/edit/restart is dropped instead of resurrecting an
/// abandoned step. Tokens are drawn from a process-wide counter, so a
/// token from one attempt can never match a later attempt either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    step: CheckoutStep,
    method: Option<DeliveryMethod>,
    token: u64,
    pricing_in_flight: bool,
}

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(0);

fn fresh_token() -> u64 {
    NEXT_TOKEN.fetch_add(1, Ordering::Relaxed)
}

impl Checkout {
    #[must_use]
    pub fn new() -> Self {
        Self {
            step: CheckoutStep::Method,
            method: None,
            token: fresh_token(),
            pricing_in_flight: false,
        }
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub const fn method(&self) -> Option<DeliveryMethod> {
        self.method
    }

    #[must_use]
    pub const fn pricing_in_flight(&self) -> bool {
        self.pricing_in_flight
    }

    /// Choose the delivery method, moving to the matching detail step.
    ///
    /// # Errors
    ///
    /// Rejected off the `Method` step.
    pub fn choose_method(&mut self, method: DeliveryMethod) -> Result<(), CheckoutError> {
        self.require_step(CheckoutStep::Method)?;
        self.method = Some(method);
        self.step = match method {
            DeliveryMethod::Door => CheckoutStep::Address,
            DeliveryMethod::Office => CheckoutStep::Office,
        };
        self.advance_token();
        Ok(())
    }

    /// Step back to method selection, abandoning the detail step and any
    /// pricing call running for it.
    ///
    /// # Errors
    ///
    /// Rejected outside the detail steps.
    pub fn go_back(&mut self) -> Result<(), CheckoutError> {
        match self.step {
            CheckoutStep::Address | CheckoutStep::Office => {
                self.reset_to_method();
                Ok(())
            }
            step => Err(CheckoutError::WrongStep(step)),
        }
    }

    /// Reopen delivery selection from the summary.
    ///
    /// # Errors
    ///
    /// Rejected off the `Summary` step.
    pub fn edit_delivery(&mut self) -> Result<(), CheckoutError> {
        self.require_step(CheckoutStep::Summary)?;
        self.reset_to_method();
        Ok(())
    }

    /// Mark a pricing call as started on the given detail step, returning
    /// the token its result must present.
    ///
    /// # Errors
    ///
    /// Rejected off `step` or while another call is already running.
    pub fn begin_pricing(&mut self, step: CheckoutStep) -> Result<u64, CheckoutError> {
        self.require_step(step)?;
        if self.pricing_in_flight {
            return Err(CheckoutError::PricingInFlight);
        }
        self.pricing_in_flight = true;
        Ok(self.token)
    }

    /// Apply a finished pricing call. Returns whether the attempt still
    /// matched; a stale token leaves the state untouched.
    pub fn commit_pricing(&mut self, token: u64) -> bool {
        if self.token == token && self.pricing_in_flight {
            self.pricing_in_flight = false;
            self.step = CheckoutStep::Summary;
            self.advance_token();
            true
        } else {
            false
        }
    }

    /// Abandon a pricing call that failed validation before producing a
    /// quote. The step stays put so the client can correct and resubmit.
    /// A stale token is a no-op, same as `commit_pricing`.
    pub fn cancel_pricing(&mut self, token: u64) {
        if self.token == token && self.pricing_in_flight {
            self.pricing_in_flight = false;
            self.advance_token();
        }
    }

    fn reset_to_method(&mut self) {
        self.step = CheckoutStep::Method;
        self.method = None;
        self.pricing_in_flight = false;
        self.advance_token();
    }

    fn require_step(&self, step: CheckoutStep) -> Result<(), CheckoutError> {
        if self.step == step {
            Ok(())
        } else {
            Err(CheckoutError::WrongStep(self.step))
        }
    }

    fn advance_token(&mut self) {
        self.token = fresh_token();
    }
}

impl Default for Checkout {
    fn default() -> Self {
        Self::new()
    }
}

// ====== Office selection ======

/// Default-office policy: an explicit office id must belong to the city's
/// listing; no id selects the first listed office.
///
/// # Errors
///
/// An empty listing or a foreign office id is a validation failure.
pub fn select_office<'a>(
    offices: &'a [Office],
    city_id: CityId,
    requested: Option<OfficeId>,
) -> Result<&'a Office, CheckoutError> {
    match requested {
        Some(office_id) => offices
            .iter()
            .find(|office| office.id == office_id)
            .ok_or(CheckoutError::OfficeNotInCity {
                office: office_id,
                city: city_id,
            }),
        None => offices.first().ok_or(CheckoutError::NoOffices(city_id)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::econt::fallback;

    #[test]
    fn test_new_attempt_starts_at_method() {
        let checkout = Checkout::new();
        assert_eq!(checkout.step(), CheckoutStep::Method);
        assert_eq!(checkout.method(), None);
        assert!(!checkout.pricing_in_flight());
    }

    #[test]
    fn test_choose_method_routes_to_detail_step() {
        let mut door = Checkout::new();
        door.choose_method(DeliveryMethod::Door).unwrap();
        assert_eq!(door.step(), CheckoutStep::Address);
        assert_eq!(door.method(), Some(DeliveryMethod::Door));

        let mut office = Checkout::new();
        office.choose_method(DeliveryMethod::Office).unwrap();
        assert_eq!(office.step(), CheckoutStep::Office);
    }

    #[test]
    fn test_choose_method_rejected_off_method_step() {
        let mut checkout = Checkout::new();
        checkout.choose_method(DeliveryMethod::Door).unwrap();
        let err = checkout.choose_method(DeliveryMethod::Office).unwrap_err();
        assert_eq!(err, CheckoutError::WrongStep(CheckoutStep::Address));
        assert_eq!(checkout.method(), Some(DeliveryMethod::Door));
    }

    #[test]
    fn test_back_returns_to_method_and_clears_choice() {
        let mut checkout = Checkout::new();
        checkout.choose_method(DeliveryMethod::Office).unwrap();
        checkout.go_back().unwrap();
        assert_eq!(checkout.step(), CheckoutStep::Method);
        assert_eq!(checkout.method(), None);
    }

    #[test]
    fn test_back_rejected_at_method() {
        let mut checkout = Checkout::new();
        assert_eq!(
            checkout.go_back().unwrap_err(),
            CheckoutError::WrongStep(CheckoutStep::Method)
        );
    }

    #[test]
    fn test_pricing_guard_rejects_reentry() {
        let mut checkout = Checkout::new();
        checkout.choose_method(DeliveryMethod::Door).unwrap();
        checkout.begin_pricing(CheckoutStep::Address).unwrap();
        assert_eq!(
            checkout.begin_pricing(CheckoutStep::Address).unwrap_err(),
            CheckoutError::PricingInFlight
        );
    }

    #[test]
    fn test_commit_moves_to_summary() {
        let mut checkout = Checkout::new();
        checkout.choose_method(DeliveryMethod::Door).unwrap();
        let token = checkout.begin_pricing(CheckoutStep::Address).unwrap();
        assert!(checkout.commit_pricing(token));
        assert_eq!(checkout.step(), CheckoutStep::Summary);
        assert!(!checkout.pricing_in_flight());
    }

    #[test]
    fn test_stale_token_is_dropped() {
        let mut checkout = Checkout::new();
        checkout.choose_method(DeliveryMethod::Door).unwrap();
        let token = checkout.begin_pricing(CheckoutStep::Address).unwrap();

        // The user backs out while the pricing call is in flight.
        checkout.go_back().unwrap();
        assert!(!checkout.commit_pricing(token));
        assert_eq!(checkout.step(), CheckoutStep::Method);

        // A fresh attempt over the same steps gets its own token.
        checkout.choose_method(DeliveryMethod::Door).unwrap();
        let fresh = checkout.begin_pricing(CheckoutStep::Address).unwrap();
        assert_ne!(fresh, token);
        assert!(checkout.commit_pricing(fresh));
        assert_eq!(checkout.step(), CheckoutStep::Summary);
    }

    #[test]
    fn test_cancel_pricing_keeps_the_step_open() {
        let mut checkout = Checkout::new();
        checkout.choose_method(DeliveryMethod::Office).unwrap();
        let token = checkout.begin_pricing(CheckoutStep::Office).unwrap();

        // Validation failed after dispatch; the step stays correctable.
        checkout.cancel_pricing(token);
        assert_eq!(checkout.step(), CheckoutStep::Office);
        assert!(!checkout.pricing_in_flight());

        // The cancelled token cannot commit later.
        assert!(!checkout.commit_pricing(token));

        // And the step accepts a new pricing call.
        let fresh = checkout.begin_pricing(CheckoutStep::Office).unwrap();
        assert_ne!(fresh, token);
        assert!(checkout.commit_pricing(fresh));
    }

    #[test]
    fn test_token_from_one_attempt_never_matches_another() {
        let mut first = Checkout::new();
        first.choose_method(DeliveryMethod::Door).unwrap();
        let token = first.begin_pricing(CheckoutStep::Address).unwrap();

        // The attempt is thrown away mid-flight and rebuilt from scratch,
        // walked to the same step with a pricing call of its own running.
        let mut second = Checkout::new();
        second.choose_method(DeliveryMethod::Door).unwrap();
        let own = second.begin_pricing(CheckoutStep::Address).unwrap();

        assert!(!second.commit_pricing(token));
        assert_eq!(second.step(), CheckoutStep::Address);
        assert!(second.commit_pricing(own));
    }

    #[test]
    fn test_edit_delivery_reopens_from_summary() {
        let mut checkout = Checkout::new();
        checkout.choose_method(DeliveryMethod::Office).unwrap();
        let token = checkout.begin_pricing(CheckoutStep::Office).unwrap();
        checkout.commit_pricing(token);

        checkout.edit_delivery().unwrap();
        assert_eq!(checkout.step(), CheckoutStep::Method);
        assert_eq!(checkout.method(), None);

        let mut fresh = Checkout::new();
        assert_eq!(
            fresh.edit_delivery().unwrap_err(),
            CheckoutError::WrongStep(CheckoutStep::Method)
        );
    }

    #[test]
    fn test_select_office_defaults_to_first() {
        let offices = fallback::offices_in(Some(CityId::new(1)));
        let chosen = select_office(&offices, CityId::new(1), None).unwrap();
        assert_eq!(chosen.id, OfficeId::new(101));
    }

    #[test]
    fn test_select_office_respects_explicit_choice() {
        let offices = fallback::offices_in(Some(CityId::new(1)));
        let automat = select_office(&offices, CityId::new(1), Some(OfficeId::new(102))).unwrap();
        assert!(automat.is_aps);
    }

    #[test]
    fn test_select_office_rejects_foreign_and_empty() {
        let offices = fallback::offices_in(Some(CityId::new(1)));
        assert_eq!(
            select_office(&offices, CityId::new(1), Some(OfficeId::new(701))).unwrap_err(),
            CheckoutError::OfficeNotInCity {
                office: OfficeId::new(701),
                city: CityId::new(1),
            }
        );
        assert_eq!(
            select_office(&[], CityId::new(5), None).unwrap_err(),
            CheckoutError::NoOffices(CityId::new(5))
        );
    }

    #[test]
    fn test_street_address_parse() {
        let address =
            StreetAddress::parse("  ул. Шипка 3 ", Some("  ".to_owned()), Some("звънец 2".to_owned()))
                .unwrap();
        assert_eq!(address.street, "ул. Шипка 3");
        assert_eq!(address.quarter, None);
        assert_eq!(address.notes.as_deref(), Some("звънец 2"));

        assert_eq!(
            StreetAddress::parse("   ", None, None).unwrap_err(),
            CheckoutError::MissingStreet
        );
    }

    #[test]
    fn test_quote_serializes_with_flattened_destination() {
        let city = fallback::cities_matching(Some("Петрич")).remove(0);
        let quote = DeliveryQuote {
            price: Decimal::new(1099, 2),
            currency: "BGN".to_owned(),
            deadline: 2,
            pickup_date: NaiveDate::from_ymd_opt(2025, 4, 7).unwrap(),
            delivery_date: NaiveDate::from_ymd_opt(2025, 4, 9).unwrap(),
            saturday_delivery: false,
            destination: DeliveryDestination::Door {
                city,
                address: StreetAddress::parse("ул. Шипка 3", None, None).unwrap(),
            },
        };

        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json.get("method"), Some(&serde_json::json!("door")));
        assert_eq!(json.get("price"), Some(&serde_json::json!("10.99")));
        assert!(json.get("address").is_some());
        assert!(json.get("office").is_none());

        let back: DeliveryQuote = serde_json::from_value(json).unwrap();
        assert_eq!(back, quote);
        assert_eq!(back.method(), DeliveryMethod::Door);
    }
}
