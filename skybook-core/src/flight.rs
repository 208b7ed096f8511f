use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A flight row as served to clients. Catalog flights carry their
/// database id; externally-fetched and sample flights carry a synthetic
/// negative id and are not persisted until someone books them.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Flight {
    pub id: i64,
    pub flight_number: String,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub price: BigDecimal,
    pub total_seats: i32,
    pub available_seats: i32,
}

/// Full flight payload a client submits when booking a flight that is
/// not yet in the catalog. Mirrors the search response minus the
/// availability fields the server recomputes on materialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightData {
    pub flight_number: String,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub price: BigDecimal,
    pub total_seats: i32,
}

/// Flight identifier as received in a booking request: either an
/// existing catalog id or an opaque id for a flight that only exists
/// upstream (accompanied by a `FlightData` payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlightId {
    Catalog(i64),
    External(String),
}

impl FlightId {
    /// Numeric id to probe the catalog with, if one can be read out of
    /// the identifier. Synthetic ids are numeric too, so a failed probe
    /// falls through to materialization.
    pub fn catalog_id(&self) -> Option<i64> {
        match self {
            FlightId::Catalog(id) => Some(*id),
            FlightId::External(s) => s.parse().ok(),
        }
    }
}

/// One-way search parameters, already validated by the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flight_id_accepts_numbers_and_strings() {
        let id: FlightId = serde_json::from_str("42").unwrap();
        assert_eq!(id.catalog_id(), Some(42));

        let id: FlightId = serde_json::from_str("\"-901233\"").unwrap();
        assert_eq!(id.catalog_id(), Some(-901233));

        let id: FlightId = serde_json::from_str("\"UA1549-20260301\"").unwrap();
        assert_eq!(id.catalog_id(), None);
    }

    #[test]
    fn flight_data_uses_camel_case() {
        let raw = r#"{
            "flightNumber": "SB101",
            "airline": "SkyBook Air",
            "origin": "JFK",
            "destination": "LAX",
            "departureTime": "2026-09-01T08:00:00Z",
            "arrivalTime": "2026-09-01T11:30:00Z",
            "price": "299.00",
            "totalSeats": 180
        }"#;
        let data: FlightData = serde_json::from_str(raw).unwrap();
        assert_eq!(data.flight_number, "SB101");
        assert_eq!(data.total_seats, 180);
    }
}
