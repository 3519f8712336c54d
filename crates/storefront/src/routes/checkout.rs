//! Checkout routes.
//!
//! The session lock is never held across a courier call: a detail-step
//! handler captures a pricing token under the lock, releases it for the
//! network round trip, then re-locks to commit. A commit whose token went
//! stale (the user backed out or restarted meanwhile) is dropped and the
//! handler answers with the current state instead.

use axum::{Json, extract::State};
use rupite_greens_core::{CityId, OfficeId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::checkout::{
    self, Checkout, CheckoutError, CheckoutStep, DeliveryDestination, DeliveryMethod,
    DeliveryQuote, StreetAddress,
};
use crate::econt::types::{
    CalculateRequest, CalculateResponse, City, DeliveryMode, Office, ShipmentType,
};
use crate::error::{AppError, Result};
use crate::order::{self, OrderForm, OrderSummary};
use crate::session::Session;
use crate::state::AppState;

/// Where the checkout stands: the live attempt's step and method (both
/// null when no attempt is open) and the stored quote.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub step: Option<CheckoutStep>,
    pub method: Option<DeliveryMethod>,
    pub quote: Option<DeliveryQuote>,
}

impl CheckoutView {
    fn build(session: &Session) -> Self {
        Self {
            step: session.checkout.as_ref().map(Checkout::step),
            method: session.checkout.as_ref().and_then(Checkout::method),
            quote: session.delivery.clone(),
        }
    }
}

/// Method selection payload.
#[derive(Debug, Deserialize)]
pub struct MethodRequest {
    pub method: DeliveryMethod,
}

/// Door delivery details.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub city_id: CityId,
    pub street: String,
    #[serde(default)]
    pub quarter: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub saturday_delivery: Option<bool>,
}

/// Office delivery details. Without an office id the city's first listed
/// office is taken.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeRequest {
    pub city_id: CityId,
    #[serde(default)]
    pub office_id: Option<OfficeId>,
    #[serde(default)]
    pub saturday_delivery: Option<bool>,
}

// ====== State handlers ======

/// Current checkout state.
///
/// GET /api/checkout
pub async fn show(State(state): State<AppState>) -> Json<CheckoutView> {
    let session = state.sessions().lock().await;
    Json(CheckoutView::build(&session))
}

/// Open a fresh attempt, discarding any previous one and its quote.
///
/// POST /api/checkout/start
pub async fn start(State(state): State<AppState>) -> Result<Json<CheckoutView>> {
    let view = {
        let mut session = state.sessions().lock().await;
        session.start_checkout()?;
        CheckoutView::build(&session)
    };
    state.sessions().persist().await;

    Ok(Json(view))
}

/// Choose door or office delivery.
///
/// POST /api/checkout/method
pub async fn choose_method(
    State(state): State<AppState>,
    Json(payload): Json<MethodRequest>,
) -> Result<Json<CheckoutView>> {
    let mut session = state.sessions().lock().await;
    session.checkout_mut()?.choose_method(payload.method)?;

    Ok(Json(CheckoutView::build(&session)))
}

/// Step back from a detail step to method selection.
///
/// POST /api/checkout/back
pub async fn back(State(state): State<AppState>) -> Result<Json<CheckoutView>> {
    let mut session = state.sessions().lock().await;
    session.checkout_mut()?.go_back()?;

    Ok(Json(CheckoutView::build(&session)))
}

/// Reopen delivery selection from the summary. The stored quote stays
/// until a detail step replaces it.
///
/// POST /api/checkout/edit-delivery
pub async fn edit_delivery(State(state): State<AppState>) -> Result<Json<CheckoutView>> {
    let mut session = state.sessions().lock().await;
    session.checkout_mut()?.edit_delivery()?;

    Ok(Json(CheckoutView::build(&session)))
}

// ====== Pricing handlers ======

/// Complete the address step: price door delivery to the given city and
/// move to the summary.
///
/// POST /api/checkout/address
pub async fn address(
    State(state): State<AppState>,
    Json(payload): Json<AddressRequest>,
) -> Result<Json<CheckoutView>> {
    // Validate the address before touching the machine.
    let address = StreetAddress::parse(&payload.street, payload.quarter, payload.notes)?;

    let (token, request) = begin_pricing(
        &state,
        CheckoutStep::Address,
        payload.city_id,
        DeliveryMode::Door,
        payload.saturday_delivery,
    )
    .await?;

    let city = match resolve_city(&state, payload.city_id).await {
        Ok(city) => city,
        Err(error) => {
            cancel_pricing(&state, token).await;
            return Err(error.into());
        }
    };

    let response = state.econt().calculate(&request).await;
    let quote = build_quote(response, DeliveryDestination::Door { city, address });

    commit_quote(&state, token, quote).await
}

/// Complete the office step: price delivery to an Econt office or kiosk in
/// the given city and move to the summary.
///
/// POST /api/checkout/office
pub async fn office(
    State(state): State<AppState>,
    Json(payload): Json<OfficeRequest>,
) -> Result<Json<CheckoutView>> {
    let (token, mut request) = begin_pricing(
        &state,
        CheckoutStep::Office,
        payload.city_id,
        DeliveryMode::Office,
        payload.saturday_delivery,
    )
    .await?;

    let resolved = resolve_office(&state, payload.city_id, payload.office_id).await;
    let (city, office) = match resolved {
        Ok(pair) => pair,
        Err(error) => {
            cancel_pricing(&state, token).await;
            return Err(error.into());
        }
    };

    if office.is_aps {
        request.mode = DeliveryMode::Aps;
    }

    let response = state.econt().calculate(&request).await;
    let quote = build_quote(response, DeliveryDestination::Office { city, office });

    commit_quote(&state, token, quote).await
}

// ====== Submission ======

/// Submit the order from the summary step. Clears the cart (and with it
/// the quote and the attempt) and returns the order summary.
///
/// POST /api/checkout/submit
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<OrderForm>,
) -> Result<Json<OrderSummary>> {
    let summary = {
        let mut session = state.sessions().lock().await;

        let checkout = session.checkout_mut()?;
        if checkout.pricing_in_flight() {
            return Err(CheckoutError::PricingInFlight.into());
        }
        if checkout.step() != CheckoutStep::Summary {
            return Err(CheckoutError::WrongStep(checkout.step()).into());
        }

        let contact = form.validate()?;
        let Some(quote) = session.delivery.as_ref() else {
            return Err(AppError::Internal(
                "summary step without a stored quote".to_owned(),
            ));
        };

        let merchandise_total = session.cart.merchandise_total(state.catalog());
        let summary = OrderSummary {
            order_number: order::generate_reference(),
            item_count: session.cart.item_count(),
            merchandise_total,
            delivery_fee: quote.price,
            total: merchandise_total + quote.price,
            payment_method: form.payment_method,
        };

        // The log line is the only durable record of the order.
        info!(
            order = %summary.order_number,
            email = %contact.email,
            items = summary.item_count,
            total = %summary.total,
            "Order submitted"
        );

        session.clear_cart();
        summary
    };
    state.sessions().persist().await;

    Ok(Json(summary))
}

// ====== Pricing plumbing ======

/// Mark a pricing call as started and capture the cart-derived request
/// fields, all under one short lock.
async fn begin_pricing(
    state: &AppState,
    step: CheckoutStep,
    receiver_city_id: CityId,
    mode: DeliveryMode,
    saturday_delivery: Option<bool>,
) -> Result<(u64, CalculateRequest)> {
    let mut session = state.sessions().lock().await;
    let weight = session.cart.total_weight_kg(state.catalog());
    let declared_value = session.cart.merchandise_total(state.catalog());
    let token = session.checkout_mut()?.begin_pricing(step)?;

    Ok((
        token,
        CalculateRequest {
            sender_city_id: state.config().econt.sender_city_id,
            receiver_city_id,
            weight,
            shipment_type: ShipmentType::Pack,
            mode,
            declared_value,
            saturday_delivery,
        },
    ))
}

/// Roll back an attempt whose inputs failed validation after dispatch.
async fn cancel_pricing(state: &AppState, token: u64) {
    let mut session = state.sessions().lock().await;
    if let Some(checkout) = session.checkout.as_mut() {
        checkout.cancel_pricing(token);
    }
}

/// Store the quote and advance to the summary, unless the attempt moved on
/// while the courier call ran. Either way the response is the current view.
async fn commit_quote(
    state: &AppState,
    token: u64,
    quote: DeliveryQuote,
) -> Result<Json<CheckoutView>> {
    let (view, committed) = {
        let mut session = state.sessions().lock().await;
        let committed = session
            .checkout
            .as_mut()
            .is_some_and(|checkout| checkout.commit_pricing(token));
        if committed {
            session.delivery = Some(quote);
        }
        (CheckoutView::build(&session), committed)
    };

    if committed {
        state.sessions().persist().await;
    }
    Ok(Json(view))
}

fn build_quote(response: CalculateResponse, destination: DeliveryDestination) -> DeliveryQuote {
    DeliveryQuote {
        price: response.total_price,
        currency: response.currency,
        deadline: response.delivery_deadline,
        pickup_date: response.pickup_date,
        delivery_date: response.delivery_date,
        saturday_delivery: response.saturday_delivery.unwrap_or(false),
        destination,
    }
}

async fn resolve_city(state: &AppState, city_id: CityId) -> std::result::Result<City, CheckoutError> {
    let cities = state
        .econt()
        .cities(&state.config().econt.country_code, None)
        .await;

    cities
        .into_iter()
        .find(|city| city.id == city_id)
        .ok_or(CheckoutError::UnknownCity(city_id))
}

async fn resolve_office(
    state: &AppState,
    city_id: CityId,
    office_id: Option<OfficeId>,
) -> std::result::Result<(City, Office), CheckoutError> {
    let city = resolve_city(state, city_id).await?;
    let offices = state
        .econt()
        .offices(Some(city_id), Some(&state.config().econt.country_code))
        .await;
    let office = checkout::select_office(&offices, city_id, office_id)?.clone();

    Ok((city, office))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::econt::fallback;

    #[test]
    fn test_view_is_all_null_without_an_attempt() {
        let session = Session::default();
        let json = serde_json::to_value(CheckoutView::build(&session)).unwrap();
        assert_eq!(json["step"], serde_json::Value::Null);
        assert_eq!(json["method"], serde_json::Value::Null);
        assert_eq!(json["quote"], serde_json::Value::Null);
    }

    #[test]
    fn test_view_reflects_the_open_attempt() {
        let mut session = Session::default();
        session.cart.add_item(rupite_greens_core::ProductId::new(1));
        session.start_checkout().unwrap();
        session
            .checkout_mut()
            .unwrap()
            .choose_method(DeliveryMethod::Office)
            .unwrap();

        let json = serde_json::to_value(CheckoutView::build(&session)).unwrap();
        assert_eq!(json["step"], "office");
        assert_eq!(json["method"], "office");
    }

    #[test]
    fn test_build_quote_carries_normalized_fields() {
        let response = CalculateResponse {
            total_price: Decimal::new(899, 2),
            currency: "BGN".to_owned(),
            delivery_deadline: 2,
            pickup_date: NaiveDate::from_ymd_opt(2025, 4, 7).unwrap(),
            delivery_date: NaiveDate::from_ymd_opt(2025, 4, 9).unwrap(),
            saturday_delivery: None,
        };
        let city = fallback::cities_matching(Some("Пловдив")).remove(0);
        let address = StreetAddress::parse("бул. Марица 20", None, None).unwrap();

        let quote = build_quote(response, DeliveryDestination::Door { city, address });
        assert_eq!(quote.price, Decimal::new(899, 2));
        assert_eq!(quote.deadline, 2);
        assert!(!quote.saturday_delivery);
        assert_eq!(quote.method(), DeliveryMethod::Door);
    }
}
