//! Local nomenclature directory and deterministic shipment pricing.
//!
//! Served whenever the live Econt API cannot answer: transport failure,
//! non-success status, or an unparseable body. The directory covers the
//! towns the store actually ships to, with Rupite and its Pirin neighbours
//! alongside the big express cities. Pricing is a pure function of the
//! request plus today's date.

use chrono::{Days, NaiveDate};
use rupite_greens_core::{CityId, OfficeId};
use rust_decimal::{Decimal, RoundingStrategy};

use super::types::{
    CalculateRequest, CalculateResponse, City, CityLocation, Country, DeliveryMode, Office,
    OfficeAddress, OfficeCity, OfficeLocation,
};

// ====== City directory ======

struct CitySeed {
    id: i32,
    name: &'static str,
    name_en: &'static str,
    post_code: &'static str,
    region: &'static str,
    region_en: &'static str,
    phone_code: &'static str,
    latitude: f64,
    longitude: f64,
    express: bool,
}

const CITY_SEEDS: [CitySeed; 15] = [
    CitySeed {
        id: 1,
        name: "София",
        name_en: "Sofia",
        post_code: "1000",
        region: "София-град",
        region_en: "Sofia-city",
        phone_code: "02",
        latitude: 42.6977,
        longitude: 23.3219,
        express: true,
    },
    CitySeed {
        id: 2,
        name: "Пловдив",
        name_en: "Plovdiv",
        post_code: "4000",
        region: "Пловдив",
        region_en: "Plovdiv",
        phone_code: "032",
        latitude: 42.1354,
        longitude: 24.7453,
        express: true,
    },
    CitySeed {
        id: 3,
        name: "Варна",
        name_en: "Varna",
        post_code: "9000",
        region: "Варна",
        region_en: "Varna",
        phone_code: "052",
        latitude: 43.2141,
        longitude: 27.9147,
        express: true,
    },
    CitySeed {
        id: 4,
        name: "Бургас",
        name_en: "Burgas",
        post_code: "8000",
        region: "Бургас",
        region_en: "Burgas",
        phone_code: "056",
        latitude: 42.5048,
        longitude: 27.4626,
        express: true,
    },
    CitySeed {
        id: 5,
        name: "Русе",
        name_en: "Ruse",
        post_code: "7000",
        region: "Русе",
        region_en: "Ruse",
        phone_code: "082",
        latitude: 43.8564,
        longitude: 25.9656,
        express: false,
    },
    CitySeed {
        id: 6,
        name: "Стара Загора",
        name_en: "Stara Zagora",
        post_code: "6000",
        region: "Стара Загора",
        region_en: "Stara Zagora",
        phone_code: "042",
        latitude: 42.4258,
        longitude: 25.6342,
        express: false,
    },
    CitySeed {
        id: 7,
        name: "Петрич",
        name_en: "Petrich",
        post_code: "2850",
        region: "Благоевград",
        region_en: "Blagoevgrad",
        phone_code: "0745",
        latitude: 41.3981,
        longitude: 23.2039,
        express: false,
    },
    CitySeed {
        id: 8,
        name: "Благоевград",
        name_en: "Blagoevgrad",
        post_code: "2700",
        region: "Благоевград",
        region_en: "Blagoevgrad",
        phone_code: "073",
        latitude: 42.0116,
        longitude: 23.0905,
        express: false,
    },
    CitySeed {
        id: 9,
        name: "Сандански",
        name_en: "Sandanski",
        post_code: "2800",
        region: "Благоевград",
        region_en: "Blagoevgrad",
        phone_code: "0746",
        latitude: 41.5667,
        longitude: 23.2833,
        express: false,
    },
    CitySeed {
        id: 10,
        name: "Рупите",
        name_en: "Rupite",
        post_code: "2820",
        region: "Благоевград",
        region_en: "Blagoevgrad",
        phone_code: "0745",
        latitude: 41.4167,
        longitude: 23.25,
        express: false,
    },
    CitySeed {
        id: 11,
        name: "Враца",
        name_en: "Vratsa",
        post_code: "3000",
        region: "Враца",
        region_en: "Vratsa",
        phone_code: "092",
        latitude: 43.2103,
        longitude: 23.5628,
        express: false,
    },
    CitySeed {
        id: 12,
        name: "Велико Търново",
        name_en: "Veliko Tarnovo",
        post_code: "5000",
        region: "Велико Търново",
        region_en: "Veliko Tarnovo",
        phone_code: "062",
        latitude: 43.0757,
        longitude: 25.6172,
        express: false,
    },
    CitySeed {
        id: 13,
        name: "Банкя",
        name_en: "Bankya",
        post_code: "1700",
        region: "София",
        region_en: "Sofia",
        phone_code: "02",
        latitude: 42.65,
        longitude: 23.1167,
        express: true,
    },
    CitySeed {
        id: 14,
        name: "Самоков",
        name_en: "Samokov",
        post_code: "2000",
        region: "София",
        region_en: "Sofia",
        phone_code: "0722",
        latitude: 42.3333,
        longitude: 23.55,
        express: false,
    },
    CitySeed {
        id: 15,
        name: "Годеч",
        name_en: "Godech",
        post_code: "2100",
        region: "София",
        region_en: "Sofia",
        phone_code: "0726",
        latitude: 43.0333,
        longitude: 22.85,
        express: false,
    },
];

fn bulgaria() -> Country {
    Country {
        id: Some(1),
        code2: "BG".to_owned(),
        code3: "BGR".to_owned(),
        name: "България".to_owned(),
        name_en: "Bulgaria".to_owned(),
        is_eu: true,
    }
}

fn build_city(seed: &CitySeed) -> City {
    City {
        id: CityId::new(seed.id),
        country: bulgaria(),
        post_code: seed.post_code.to_owned(),
        name: seed.name.to_owned(),
        name_en: seed.name_en.to_owned(),
        region_name: seed.region.to_owned(),
        region_name_en: seed.region_en.to_owned(),
        phone_code: seed.phone_code.to_owned(),
        location: Some(CityLocation {
            latitude: seed.latitude,
            longitude: seed.longitude,
        }),
        express_city_deliveries: seed.express,
    }
}

/// The full fixed city directory, in id order.
#[must_use]
pub fn cities() -> Vec<City> {
    CITY_SEEDS.iter().map(build_city).collect()
}

/// The directory narrowed by a case-insensitive substring over name,
/// English name, and region. No filter returns everything.
#[must_use]
pub fn cities_matching(filter: Option<&str>) -> Vec<City> {
    let mut all = cities();
    if let Some(filter) = filter.map(str::trim).filter(|f| !f.is_empty()) {
        let needle = filter.to_lowercase();
        all.retain(|city| {
            city.name.to_lowercase().contains(&needle)
                || city.name_en.to_lowercase().contains(&needle)
                || city.region_name.to_lowercase().contains(&needle)
        });
    }
    all
}

/// Whether a city id carries the express flag in the directory.
#[must_use]
pub fn is_express(city_id: CityId) -> bool {
    CITY_SEEDS
        .iter()
        .any(|seed| seed.id == city_id.as_i32() && seed.express)
}

// ====== Office directory ======

// Upstream encodes office hours as epoch milliseconds on an arbitrary
// reference day; the marks below are its values for 08:30, 18:00 and 13:00,
// kept verbatim so fallback offices compare equal to live ones.
const OPENS_0830: i64 = 1_524_117_600_000;
const CLOSES_1800: i64 = 1_524_150_000_000;
const CLOSES_1300: i64 = 1_524_132_000_000;
const DAY_START: i64 = 0;
const DAY_END: i64 = 86_400_000;

struct OfficeSeed {
    id: i32,
    code: &'static str,
    name: &'static str,
    name_en: &'static str,
    city_id: i32,
    city_name: &'static str,
    post_code: &'static str,
    street: &'static str,
    num: &'static str,
    info: &'static str,
    hub_code: &'static str,
    hub_name: &'static str,
    hub_name_en: &'static str,
    phones: &'static [&'static str],
    emails: &'static [&'static str],
    latitude: f64,
    longitude: f64,
    aps: bool,
}

const OFFICE_SEEDS: [OfficeSeed; 4] = [
    OfficeSeed {
        id: 101,
        code: "1000",
        name: "София - Център",
        name_en: "Sofia - Center",
        city_id: 1,
        city_name: "София",
        post_code: "1000",
        street: "ул. Витоша",
        num: "1",
        info: "Офис София Център",
        hub_code: "1000",
        hub_name: "София",
        hub_name_en: "Sofia",
        phones: &["+359 2 123 456"],
        emails: &["sofia@econt.com"],
        latitude: 42.6977,
        longitude: 23.3219,
        aps: false,
    },
    OfficeSeed {
        id: 102,
        code: "1001",
        name: "Автомат София Мол",
        name_en: "Sofia Mall Automat",
        city_id: 1,
        city_name: "София",
        post_code: "1000",
        street: "бул. Александър Стамболийски",
        num: "101",
        info: "Автомат 24/7",
        hub_code: "1000",
        hub_name: "София",
        hub_name_en: "Sofia",
        phones: &[],
        emails: &[],
        latitude: 42.6977,
        longitude: 23.3219,
        aps: true,
    },
    OfficeSeed {
        id: 701,
        code: "2850",
        name: "Петрич - Център",
        name_en: "Petrich - Center",
        city_id: 7,
        city_name: "Петрич",
        post_code: "2850",
        street: "ул. Цар Борис III",
        num: "15",
        info: "Офис Петрич",
        hub_code: "2850",
        hub_name: "Петрич",
        hub_name_en: "Petrich",
        phones: &["+359 745 123 456"],
        emails: &["petrich@econt.com"],
        latitude: 41.3981,
        longitude: 23.2039,
        aps: false,
    },
    OfficeSeed {
        id: 801,
        code: "2700",
        name: "Благоевград - Център",
        name_en: "Blagoevgrad - Center",
        city_id: 8,
        city_name: "Благоевград",
        post_code: "2700",
        street: "ул. Македония",
        num: "12",
        info: "Офис Благоевград",
        hub_code: "2700",
        hub_name: "Благоевград",
        hub_name_en: "Blagoevgrad",
        phones: &["+359 73 123 456"],
        emails: &["blagoevgrad@econt.com"],
        latitude: 42.0116,
        longitude: 23.0905,
        aps: false,
    },
];

fn build_office(seed: &OfficeSeed) -> Office {
    let (normal, half_day) = if seed.aps {
        ((DAY_START, DAY_END), (DAY_START, DAY_END))
    } else {
        ((OPENS_0830, CLOSES_1800), (OPENS_0830, CLOSES_1300))
    };

    Office {
        id: OfficeId::new(seed.id),
        code: seed.code.to_owned(),
        name: seed.name.to_owned(),
        name_en: seed.name_en.to_owned(),
        address: OfficeAddress {
            id: None,
            city: OfficeCity {
                id: CityId::new(seed.city_id),
                name: seed.city_name.to_owned(),
                post_code: seed.post_code.to_owned(),
            },
            full_address: format!("{} {} {}", seed.city_name, seed.street, seed.num),
            quarter: String::new(),
            street: seed.street.to_owned(),
            num: seed.num.to_owned(),
            other: String::new(),
            location: Some(OfficeLocation {
                latitude: seed.latitude,
                longitude: seed.longitude,
                confidence: 3,
            }),
            zip: None,
        },
        info: seed.info.to_owned(),
        currency: "BGN".to_owned(),
        language: "bg".to_owned(),
        normal_business_hours_from: normal.0,
        normal_business_hours_to: normal.1,
        half_day_business_hours_from: half_day.0,
        half_day_business_hours_to: half_day.1,
        shipment_types: vec!["courier".to_owned(), "post".to_owned()],
        partner_code: String::new(),
        hub_code: seed.hub_code.to_owned(),
        hub_name: seed.hub_name.to_owned(),
        hub_name_en: seed.hub_name_en.to_owned(),
        is_mps: false,
        is_aps: seed.aps,
        phones: seed.phones.iter().map(|&p| p.to_owned()).collect(),
        emails: seed.emails.iter().map(|&e| e.to_owned()).collect(),
    }
}

/// Offices in a city, in directory order. Unknown or absent city id gives
/// an empty list.
#[must_use]
pub fn offices_in(city_id: Option<CityId>) -> Vec<Office> {
    let Some(city_id) = city_id else {
        return Vec::new();
    };
    OFFICE_SEEDS
        .iter()
        .filter(|seed| seed.city_id == city_id.as_i32())
        .map(build_office)
        .collect()
}

// ====== Shipment pricing ======

/// Deterministic price quote: a flat base by same-city or cross-city, plus
/// door, saturday, and over-a-kilogram surcharges. Express-flagged receiver
/// cities get a one-day deadline, saturday forces it.
#[must_use]
pub fn calculate(request: &CalculateRequest, today: NaiveDate) -> CalculateResponse {
    let mut price = if request.sender_city_id == request.receiver_city_id {
        Decimal::new(599, 2)
    } else {
        Decimal::new(899, 2)
    };

    if request.mode == DeliveryMode::Door {
        price += Decimal::from(2);
    }
    if request.saturday() {
        price += Decimal::from(3);
    }
    if request.weight > Decimal::ONE {
        price += (request.weight - Decimal::ONE) * Decimal::new(5, 1);
    }

    let delivery_deadline = if request.saturday() || is_express(request.receiver_city_id) {
        1
    } else {
        2
    };

    CalculateResponse {
        total_price: price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        currency: "BGN".to_owned(),
        delivery_deadline,
        pickup_date: today,
        delivery_date: today
            .checked_add_days(Days::new(u64::from(delivery_deadline)))
            .unwrap_or(today),
        saturday_delivery: request.saturday_delivery,
    }
}
