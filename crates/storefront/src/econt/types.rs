//! Wire types for the Econt nomenclature and shipment-price services.
//!
//! Field names follow the upstream JSON exactly (camelCase, plus the odd
//! spellings `cityID`, `isMPS`, `isAPS`, `isEU`). The same types back both
//! live responses and the local fallback directories, so proxy output is
//! shaped identically on either path.

use chrono::{Days, NaiveDate};
use rupite_greens_core::{CityId, OfficeId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ====== Nomenclatures: cities ======

/// Country descriptor attached to every city record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    #[serde(default)]
    pub id: Option<i64>,
    pub code2: String,
    pub code3: String,
    pub name: String,
    pub name_en: String,
    #[serde(rename = "isEU")]
    pub is_eu: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CityLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// A city as served by `NomenclaturesService.getCities.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: CityId,
    pub country: Country,
    pub post_code: String,
    pub name: String,
    pub name_en: String,
    pub region_name: String,
    pub region_name_en: String,
    pub phone_code: String,
    #[serde(default)]
    pub location: Option<CityLocation>,
    /// Same-day courier coverage; such cities get the short deadline.
    pub express_city_deliveries: bool,
}

/// Body for `NomenclaturesService.getCities.json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCitiesRequest {
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitiesResponse {
    pub cities: Vec<City>,
}

// ====== Nomenclatures: offices ======

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OfficeLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub confidence: i64,
}

/// City reference inside an office address. Upstream embeds the full city
/// record here; only the identifying fields are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeCity {
    pub id: CityId,
    pub name: String,
    pub post_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeAddress {
    #[serde(default)]
    pub id: Option<i64>,
    pub city: OfficeCity,
    pub full_address: String,
    #[serde(default)]
    pub quarter: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub num: String,
    #[serde(default)]
    pub other: String,
    #[serde(default)]
    pub location: Option<OfficeLocation>,
    #[serde(default)]
    pub zip: Option<String>,
}

/// An office or parcel automat as served by
/// `NomenclaturesService.getOffices.json`.
///
/// Business-hour fields carry the upstream's absolute epoch-millisecond
/// encoding on an arbitrary reference day and are stored verbatim; the pair
/// `0`..`86400000` marks an always-open automat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Office {
    pub id: OfficeId,
    pub code: String,
    pub name: String,
    pub name_en: String,
    pub address: OfficeAddress,
    #[serde(default)]
    pub info: String,
    pub currency: String,
    pub language: String,
    pub normal_business_hours_from: i64,
    pub normal_business_hours_to: i64,
    pub half_day_business_hours_from: i64,
    pub half_day_business_hours_to: i64,
    pub shipment_types: Vec<String>,
    #[serde(default)]
    pub partner_code: String,
    pub hub_code: String,
    pub hub_name: String,
    pub hub_name_en: String,
    #[serde(rename = "isMPS")]
    pub is_mps: bool,
    #[serde(rename = "isAPS")]
    pub is_aps: bool,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub emails: Vec<String>,
}

impl Office {
    /// Both windows spanning the full day marks a 24/7 automat.
    #[must_use]
    pub fn is_round_the_clock(&self) -> bool {
        const FULL_DAY: (i64, i64) = (0, 86_400_000);
        (self.normal_business_hours_from, self.normal_business_hours_to) == FULL_DAY
            && (self.half_day_business_hours_from, self.half_day_business_hours_to) == FULL_DAY
    }
}

/// Body for `NomenclaturesService.getOffices.json`. The upstream field is
/// spelled `cityID`.
#[derive(Debug, Clone, Serialize)]
pub struct GetOfficesRequest {
    #[serde(rename = "cityID", skip_serializing_if = "Option::is_none")]
    pub city_id: Option<CityId>,
    #[serde(rename = "countryCode", skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficesResponse {
    pub offices: Vec<Office>,
}

// ====== Shipments: price calculation ======

/// Where the shipment is handed over on the receiving end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Pickup at an Econt office.
    #[default]
    Office,
    /// Courier to the door.
    Door,
    /// Automated parcel station.
    Aps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShipmentType {
    #[default]
    Pack,
    Document,
    Pallet,
}

/// A shipment-price request as accepted by the proxy endpoint and forwarded
/// to `ShipmentService.calculateShipmentPrice.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub sender_city_id: CityId,
    pub receiver_city_id: CityId,
    /// Shipment weight in kilograms.
    pub weight: Decimal,
    #[serde(default)]
    pub shipment_type: ShipmentType,
    #[serde(default)]
    pub mode: DeliveryMode,
    #[serde(default)]
    pub declared_value: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturday_delivery: Option<bool>,
}

impl CalculateRequest {
    #[must_use]
    pub fn saturday(&self) -> bool {
        self.saturday_delivery.unwrap_or(false)
    }
}

/// Extra service line attached to an upstream shipment request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentService {
    #[serde(rename = "type")]
    pub service_type: String,
    pub time_to: String,
}

impl ShipmentService {
    /// Saturday handovers ride on the priority-time service ending 13:00.
    #[must_use]
    pub fn priority_until_one_pm() -> Self {
        Self {
            service_type: "PRIORITY_TIME".to_owned(),
            time_to: "13:00".to_owned(),
        }
    }
}

/// A normalized shipment quote. Both the live path and the fallback produce
/// this shape, so callers never see which one answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateResponse {
    pub total_price: Decimal,
    pub currency: String,
    /// Delivery deadline in days from pickup.
    pub delivery_deadline: u32,
    pub pickup_date: NaiveDate,
    pub delivery_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturday_delivery: Option<bool>,
}

/// An upstream price response before normalization. The service has been
/// seen spelling the price and deadline two ways; every field is optional
/// and gaps get documented defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCalculateResponse {
    pub total_price: Option<Decimal>,
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub delivery_deadline: Option<u32>,
    pub deadline: Option<u32>,
    pub pickup_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
}

impl RawCalculateResponse {
    /// Normalize: `totalPrice` wins over `price` (default 0), currency
    /// defaults to BGN, deadline to 2 days, pickup to today, delivery to
    /// pickup plus deadline.
    #[must_use]
    pub fn normalize(self, today: NaiveDate, saturday_delivery: Option<bool>) -> CalculateResponse {
        let delivery_deadline = self.delivery_deadline.or(self.deadline).unwrap_or(2);
        let pickup_date = self.pickup_date.unwrap_or(today);
        let delivery_date = self.delivery_date.unwrap_or_else(|| {
            pickup_date
                .checked_add_days(Days::new(u64::from(delivery_deadline)))
                .unwrap_or(pickup_date)
        });

        CalculateResponse {
            total_price: self.total_price.or(self.price).unwrap_or(Decimal::ZERO),
            currency: self.currency.unwrap_or_else(|| "BGN".to_owned()),
            delivery_deadline,
            pickup_date,
            delivery_date,
            saturday_delivery,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_request_fills_defaults() {
        let request: CalculateRequest =
            serde_json::from_str(r#"{"senderCityId":1,"receiverCityId":2,"weight":1.5}"#).unwrap();
        assert_eq!(request.shipment_type, ShipmentType::Pack);
        assert_eq!(request.mode, DeliveryMode::Office);
        assert_eq!(request.declared_value, Decimal::ZERO);
        assert_eq!(request.weight, Decimal::new(15, 1));
        assert!(!request.saturday());
    }

    #[test]
    fn test_mode_and_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&DeliveryMode::Door).unwrap(),
            "\"door\""
        );
        assert_eq!(
            serde_json::to_string(&ShipmentType::Pack).unwrap(),
            "\"PACK\""
        );
    }

    #[test]
    fn test_saturday_service_shape() {
        let json = serde_json::to_value(ShipmentService::priority_until_one_pm()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "PRIORITY_TIME", "timeTo": "13:00"})
        );
    }

    #[test]
    fn test_normalize_empty_body() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let normalized = RawCalculateResponse::default().normalize(today, None);
        assert_eq!(normalized.total_price, Decimal::ZERO);
        assert_eq!(normalized.currency, "BGN");
        assert_eq!(normalized.delivery_deadline, 2);
        assert_eq!(normalized.pickup_date, today);
        assert_eq!(
            normalized.delivery_date,
            NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
        );
    }

    #[test]
    fn test_normalize_prefers_primary_spellings() {
        let raw: RawCalculateResponse = serde_json::from_str(
            r#"{"totalPrice":"10.40","price":"9.99","deliveryDeadline":1,"deadline":3}"#,
        )
        .unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let normalized = raw.normalize(today, Some(true));
        assert_eq!(normalized.total_price, Decimal::new(1040, 2));
        assert_eq!(normalized.delivery_deadline, 1);
        assert_eq!(normalized.saturday_delivery, Some(true));
    }

    #[test]
    fn test_normalize_keeps_upstream_dates() {
        let raw: RawCalculateResponse = serde_json::from_str(
            r#"{"price":4.2,"pickupDate":"2025-03-11","deliveryDate":"2025-03-13"}"#,
        )
        .unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let normalized = raw.normalize(today, None);
        assert_eq!(
            normalized.pickup_date,
            NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()
        );
        assert_eq!(
            normalized.delivery_date,
            NaiveDate::from_ymd_opt(2025, 3, 13).unwrap()
        );
        assert_eq!(normalized.total_price, Decimal::new(42, 1));
    }

    #[test]
    fn test_office_city_parses_from_full_record() {
        // Upstream embeds the complete city; extra fields are ignored.
        let city: OfficeCity = serde_json::from_str(
            r#"{"id":7,"country":{"id":1,"code2":"BG","code3":"BGR","name":"България","nameEn":"Bulgaria","isEU":true},"postCode":"2850","name":"Петрич","nameEn":"Petrich","regionName":"Благоевград","regionNameEn":"Blagoevgrad","phoneCode":"0745","location":null,"expressCityDeliveries":false}"#,
        )
        .unwrap();
        assert_eq!(city.id, CityId::new(7));
        assert_eq!(city.post_code, "2850");
    }

    #[test]
    fn test_country_eu_flag_spelling() {
        let country = Country {
            id: Some(1),
            code2: "BG".to_owned(),
            code3: "BGR".to_owned(),
            name: "България".to_owned(),
            name_en: "Bulgaria".to_owned(),
            is_eu: true,
        };
        let json = serde_json::to_value(&country).unwrap();
        assert_eq!(json.get("isEU"), Some(&serde_json::Value::Bool(true)));
        assert_eq!(json.get("nameEn").and_then(|v| v.as_str()), Some("Bulgaria"));
    }
}
