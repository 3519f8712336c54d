//! Econt courier integration.
//!
//! [`EcontClient`] fronts the live API. Each call gets a single upstream
//! attempt bounded by the configured timeout; any failure (transport,
//! status, or parse) drops to the local [`fallback`] data, so callers
//! always get an answer and no courier error escapes this module.
//! Successful nomenclature responses are cached using `moka` (5-minute
//! TTL); fallback data is computed fresh and never cached.

pub mod fallback;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use moka::future::Cache;
use rupite_greens_core::CityId;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::EcontConfig;
use types::{
    CalculateRequest, CalculateResponse, CitiesResponse, City, GetCitiesRequest,
    GetOfficesRequest, Office, OfficesResponse, RawCalculateResponse, ShipmentService,
};

const CITIES_PATH: &str = "Nomenclatures/NomenclaturesService.getCities.json";
const OFFICES_PATH: &str = "Nomenclatures/NomenclaturesService.getOffices.json";
const CALCULATE_PATH: &str = "Shipments/ShipmentService.calculateShipmentPrice.json";

/// Errors from the live Econt API. Adapter-internal: every public method
/// recovers via fallback, so these surface only in logs.
#[derive(Debug, Error)]
pub enum EcontError {
    /// HTTP request failed or the body did not decode.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Endpoint path did not resolve against the base URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Cached nomenclature responses.
#[derive(Debug, Clone)]
enum CacheValue {
    Cities(Vec<City>),
    Offices(Vec<Office>),
}

/// Upstream shipment-price body: the request plus optional service lines.
#[derive(Serialize)]
struct CalculatePayload<'a> {
    #[serde(flatten)]
    request: &'a CalculateRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    services: Option<Vec<ShipmentService>>,
}

// =============================================================================
// EcontClient
// =============================================================================

/// Client for the Econt nomenclature and shipment services.
#[derive(Clone)]
pub struct EcontClient {
    inner: Arc<EcontClientInner>,
}

struct EcontClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, CacheValue>,
}

impl EcontClient {
    /// Create a new Econt API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &EcontConfig) -> Result<Self, EcontError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(EcontClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Cities for a country, narrowed by an optional name filter.
    #[instrument(skip(self))]
    pub async fn cities(&self, country_code: &str, name: Option<&str>) -> Vec<City> {
        let cache_key = format!("cities:{country_code}:{}", name.unwrap_or(""));

        if let Some(CacheValue::Cities(cities)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for cities");
            return cities;
        }

        match self.fetch_cities(country_code, name).await {
            Ok(cities) => {
                self.inner
                    .cache
                    .insert(cache_key, CacheValue::Cities(cities.clone()))
                    .await;
                cities
            }
            Err(error) => {
                warn!(%error, "Econt cities lookup failed, serving local directory");
                fallback::cities_matching(name)
            }
        }
    }

    /// Offices in a city (every office of the country when no city is
    /// given).
    #[instrument(skip(self))]
    pub async fn offices(
        &self,
        city_id: Option<CityId>,
        country_code: Option<&str>,
    ) -> Vec<Office> {
        let cache_key = format!(
            "offices:{}:{}",
            city_id.map_or_else(String::new, |id| id.to_string()),
            country_code.unwrap_or(""),
        );

        if let Some(CacheValue::Offices(offices)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for offices");
            return offices;
        }

        match self.fetch_offices(city_id, country_code).await {
            Ok(offices) => {
                self.inner
                    .cache
                    .insert(cache_key, CacheValue::Offices(offices.clone()))
                    .await;
                offices
            }
            Err(error) => {
                warn!(%error, "Econt offices lookup failed, serving local directory");
                fallback::offices_in(city_id)
            }
        }
    }

    /// Price a shipment. The live service is asked at most once; on any
    /// failure the deterministic local tariff answers instead.
    #[instrument(skip(self), fields(receiver = %request.receiver_city_id, mode = ?request.mode))]
    pub async fn calculate(&self, request: &CalculateRequest) -> CalculateResponse {
        let today = Local::now().date_naive();

        match self.fetch_quote(request).await {
            Ok(raw) => raw.normalize(today, request.saturday_delivery),
            Err(error) => {
                warn!(%error, "Econt price calculation failed, using local tariff");
                fallback::calculate(request, today)
            }
        }
    }

    async fn fetch_cities(
        &self,
        country_code: &str,
        name: Option<&str>,
    ) -> Result<Vec<City>, EcontError> {
        let body = GetCitiesRequest {
            country_code: country_code.to_owned(),
            name: name.map(str::to_owned),
        };
        let response: CitiesResponse = self.post_json(CITIES_PATH, &body).await?;
        Ok(response.cities)
    }

    async fn fetch_offices(
        &self,
        city_id: Option<CityId>,
        country_code: Option<&str>,
    ) -> Result<Vec<Office>, EcontError> {
        let body = GetOfficesRequest {
            city_id,
            country_code: country_code.map(str::to_owned),
        };
        let response: OfficesResponse = self.post_json(OFFICES_PATH, &body).await?;
        Ok(response.offices)
    }

    async fn fetch_quote(
        &self,
        request: &CalculateRequest,
    ) -> Result<RawCalculateResponse, EcontError> {
        let payload = CalculatePayload {
            request,
            services: request
                .saturday()
                .then(|| vec![ShipmentService::priority_until_one_pm()]),
        };
        self.post_json(CALCULATE_PATH, &payload).await
    }

    /// POST a JSON body and decode a JSON response.
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, EcontError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let url = endpoint_url(&self.inner.base_url, path)?;
        let response = self.inner.client.post(url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EcontError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

/// Resolve a service path against the base URL. `Url::join` would drop the
/// last path segment of a base without a trailing slash.
fn endpoint_url(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    if base.path().ends_with('/') {
        base.join(path)
    } else {
        Url::parse(&format!("{base}/{path}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::econt::types::{DeliveryMode, ShipmentType};

    fn unroutable_config() -> EcontConfig {
        EcontConfig {
            base_url: Url::parse("http://127.0.0.1:9/services").unwrap(),
            country_code: "BGR".to_owned(),
            sender_city_id: CityId::new(1),
            timeout_secs: 1,
        }
    }

    #[test]
    fn test_endpoint_url_preserves_base_path() {
        let bare = Url::parse("https://ee.econt.com/services").unwrap();
        let slashed = Url::parse("https://ee.econt.com/services/").unwrap();
        for base in [bare, slashed] {
            assert_eq!(
                endpoint_url(&base, CITIES_PATH).unwrap().as_str(),
                "https://ee.econt.com/services/Nomenclatures/NomenclaturesService.getCities.json"
            );
        }
    }

    #[test]
    fn test_calculate_payload_shape() {
        let request = CalculateRequest {
            sender_city_id: CityId::new(1),
            receiver_city_id: CityId::new(7),
            weight: Decimal::new(194, 2),
            shipment_type: ShipmentType::Pack,
            mode: DeliveryMode::Door,
            declared_value: Decimal::new(3030, 2),
            saturday_delivery: Some(true),
        };
        let payload = CalculatePayload {
            request: &request,
            services: request
                .saturday()
                .then(|| vec![ShipmentService::priority_until_one_pm()]),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json.get("senderCityId"), Some(&serde_json::json!(1)));
        assert_eq!(json.get("mode"), Some(&serde_json::json!("door")));
        assert_eq!(
            json.get("services"),
            Some(&serde_json::json!([{"type": "PRIORITY_TIME", "timeTo": "13:00"}]))
        );
    }

    #[test]
    fn test_calculate_payload_omits_services_without_saturday() {
        let request = CalculateRequest {
            sender_city_id: CityId::new(1),
            receiver_city_id: CityId::new(1),
            weight: Decimal::ONE,
            shipment_type: ShipmentType::Pack,
            mode: DeliveryMode::Office,
            declared_value: Decimal::ZERO,
            saturday_delivery: None,
        };
        let payload = CalculatePayload {
            request: &request,
            services: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("services").is_none());
        assert!(json.get("saturdayDelivery").is_none());
    }

    #[tokio::test]
    async fn test_unreachable_api_serves_local_directory() {
        let client = EcontClient::new(&unroutable_config()).unwrap();

        let cities = client.cities("BGR", None).await;
        assert_eq!(cities.len(), 15);

        let offices = client.offices(Some(CityId::new(1)), None).await;
        assert_eq!(offices.len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_api_prices_locally() {
        let client = EcontClient::new(&unroutable_config()).unwrap();
        let request = CalculateRequest {
            sender_city_id: CityId::new(1),
            receiver_city_id: CityId::new(1),
            weight: Decimal::ONE,
            shipment_type: ShipmentType::Pack,
            mode: DeliveryMode::Office,
            declared_value: Decimal::ZERO,
            saturday_delivery: None,
        };
        let quote = client.calculate(&request).await;
        assert_eq!(quote.total_price, Decimal::new(599, 2));
        assert_eq!(quote.currency, "BGN");
    }
}
