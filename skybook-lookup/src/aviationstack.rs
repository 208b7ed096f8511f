use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;

use skybook_core::{Flight, FlightQuery, FlightSource, LookupError};

use crate::airports::{Airport, AirportsSource};
use crate::{stable_seed, synthetic_id};

/// AviationStack client: first tier of the lookup chain and the
/// external half of the airport directory. Every request carries a
/// bounded timeout; all failures are typed so the chain can fall back.
#[derive(Clone)]
pub struct AviationStack {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AviationStack {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Upstream(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<String, LookupError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(&[("access_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| LookupError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Rejected(format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| LookupError::Upstream(e.to_string()))
    }

}

#[async_trait]
impl AirportsSource for AviationStack {
    async fn search_airports(&self, query: &str) -> Result<Vec<Airport>, LookupError> {
        let body = self.get_json("airports", &[("search", query), ("limit", "10")]).await?;
        parse_airports(&body)
    }
}

#[async_trait]
impl FlightSource for AviationStack {
    fn name(&self) -> &'static str {
        "aviationstack"
    }

    async fn search(&self, query: &FlightQuery) -> Result<Vec<Flight>, LookupError> {
        let date = query.departure_date.to_string();
        let body = self
            .get_json(
                "flights",
                &[
                    ("dep_iata", query.origin.to_uppercase().as_str()),
                    ("arr_iata", query.destination.to_uppercase().as_str()),
                    ("flight_date", date.as_str()),
                ],
            )
            .await?;
        parse_flights(&body)
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct ApiFlight {
    airline: Option<ApiAirline>,
    flight: Option<ApiFlightNumber>,
    departure: Option<ApiEndpoint>,
    arrival: Option<ApiEndpoint>,
}

#[derive(Deserialize)]
struct ApiAirline {
    name: Option<String>,
}

#[derive(Deserialize)]
struct ApiFlightNumber {
    iata: Option<String>,
}

#[derive(Deserialize)]
struct ApiEndpoint {
    iata: Option<String>,
    scheduled: Option<DateTime<FixedOffset>>,
}

#[derive(Deserialize)]
struct ApiAirport {
    airport_name: Option<String>,
    iata_code: Option<String>,
    country_name: Option<String>,
}

/// Turn an AviationStack `/flights` response into internal flights.
/// Rows missing the fields we need are skipped; an error body or an
/// empty result set is a typed failure so the chain advances.
pub(crate) fn parse_flights(body: &str) -> Result<Vec<Flight>, LookupError> {
    let envelope: Envelope<ApiFlight> =
        serde_json::from_str(body).map_err(|e| LookupError::Upstream(e.to_string()))?;

    if let Some(error) = envelope.error {
        return Err(LookupError::Rejected(
            error
                .message
                .or(error.code)
                .unwrap_or_else(|| "unspecified upstream error".to_string()),
        ));
    }

    let flights: Vec<Flight> = envelope.data.into_iter().filter_map(to_flight).collect();
    if flights.is_empty() {
        return Err(LookupError::Empty);
    }
    Ok(flights)
}

fn to_flight(api: ApiFlight) -> Option<Flight> {
    let departure = api.departure?;
    let arrival = api.arrival?;
    let flight_number = api.flight.and_then(|f| f.iata)?;
    let origin = departure.iata?;
    let destination = arrival.iata?;
    let departure_time = departure.scheduled?.with_timezone(&Utc);
    let arrival_time = arrival.scheduled?.with_timezone(&Utc);
    let airline = api
        .airline
        .and_then(|a| a.name)
        .unwrap_or_else(|| "Unknown".to_string());

    // AviationStack has no fares or seat maps; synthesize both
    // deterministically from the flight number so repeated searches
    // agree with each other.
    let seed = stable_seed(&format!("{flight_number}|{}", departure_time.date_naive()));
    let price_cents = (9_900 + seed % 42_000) as i64;
    let total_seats = 180;
    let available_seats = 30 + ((seed >> 16) % 150) as i32;

    Some(Flight {
        id: synthetic_id(seed),
        flight_number,
        airline,
        origin,
        destination,
        departure_time,
        arrival_time,
        price: BigDecimal::from(price_cents) / BigDecimal::from(100),
        total_seats,
        available_seats,
    })
}

pub(crate) fn parse_airports(body: &str) -> Result<Vec<Airport>, LookupError> {
    let envelope: Envelope<ApiAirport> =
        serde_json::from_str(body).map_err(|e| LookupError::Upstream(e.to_string()))?;

    if let Some(error) = envelope.error {
        return Err(LookupError::Rejected(
            error
                .message
                .or(error.code)
                .unwrap_or_else(|| "unspecified upstream error".to_string()),
        ));
    }

    Ok(envelope
        .data
        .into_iter()
        .filter_map(|a| {
            Some(Airport {
                code: a.iata_code?,
                name: a.airport_name?,
                city: a.country_name.unwrap_or_default(),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flight_payload() {
        let body = r#"{
            "data": [
                {
                    "flight_date": "2026-09-01",
                    "airline": {"name": "United Airlines"},
                    "flight": {"iata": "UA1549"},
                    "departure": {"iata": "JFK", "scheduled": "2026-09-01T08:30:00+00:00"},
                    "arrival": {"iata": "LAX", "scheduled": "2026-09-01T11:45:00+00:00"}
                },
                {
                    "flight_date": "2026-09-01",
                    "airline": {"name": "Incomplete"},
                    "flight": {"iata": null},
                    "departure": {"iata": "JFK", "scheduled": null},
                    "arrival": {"iata": "LAX", "scheduled": null}
                }
            ]
        }"#;

        let flights = parse_flights(body).unwrap();
        assert_eq!(flights.len(), 1);
        let flight = &flights[0];
        assert_eq!(flight.flight_number, "UA1549");
        assert_eq!(flight.airline, "United Airlines");
        assert_eq!(flight.origin, "JFK");
        assert_eq!(flight.destination, "LAX");
        assert!(flight.id < 0);
        assert!(flight.available_seats > 0);
        assert!(flight.available_seats <= flight.total_seats);
    }

    #[test]
    fn synthesized_fields_are_stable() {
        let body = r#"{
            "data": [{
                "airline": {"name": "United Airlines"},
                "flight": {"iata": "UA1549"},
                "departure": {"iata": "JFK", "scheduled": "2026-09-01T08:30:00+00:00"},
                "arrival": {"iata": "LAX", "scheduled": "2026-09-01T11:45:00+00:00"}
            }]
        }"#;
        let a = parse_flights(body).unwrap();
        let b = parse_flights(body).unwrap();
        assert_eq!(a[0].id, b[0].id);
        assert_eq!(a[0].price, b[0].price);
    }

    #[test]
    fn subscription_restriction_is_rejected() {
        let body = r#"{
            "error": {
                "code": "function_access_restricted",
                "message": "Your current subscription plan does not support this API function."
            }
        }"#;
        match parse_flights(body) {
            Err(LookupError::Rejected(msg)) => assert!(msg.contains("subscription")),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn empty_data_is_a_typed_failure() {
        assert!(matches!(parse_flights(r#"{"data": []}"#), Err(LookupError::Empty)));
    }

    #[test]
    fn parses_airport_payload() {
        let body = r#"{
            "data": [
                {"airport_name": "John F Kennedy International", "iata_code": "JFK", "country_name": "United States"},
                {"airport_name": "Nameless", "iata_code": null}
            ]
        }"#;
        let airports = parse_airports(body).unwrap();
        assert_eq!(airports.len(), 1);
        assert_eq!(airports[0].code, "JFK");
    }
}
