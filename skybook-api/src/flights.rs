use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use skybook_core::{Flight, FlightQuery};
use skybook_lookup::airports::Airport;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/flights", get(list_flights))
        .route("/api/flights/search", get(search_flights))
        .route("/api/flights/airports", get(list_airports))
        .route("/api/flights/airports/search", get(search_airports))
        .route("/api/flights/{id}", get(get_flight))
}

async fn list_flights(State(state): State<AppState>) -> Result<Json<Vec<Flight>>, AppError> {
    let flights = state.flights.list_available().await?;
    Ok(Json(flights))
}

async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Flight>, AppError> {
    let flight = state
        .flights
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Flight not found".to_string()))?;
    Ok(Json(flight))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    origin: Option<String>,
    destination: Option<String>,
    departure_date: Option<String>,
}

async fn search_flights(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Flight>>, AppError> {
    let query = validate_search(&params)?;
    // The chain absorbs every upstream failure; worst case is an
    // empty list, never a 5xx.
    let flights = state.lookup.search(&query).await;
    Ok(Json(flights))
}

async fn list_airports(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let airports = state.flights.airports().await?;
    Ok(Json(airports))
}

#[derive(Debug, Deserialize)]
pub struct AirportSearchParams {
    query: Option<String>,
}

async fn search_airports(
    State(state): State<AppState>,
    Query(params): Query<AirportSearchParams>,
) -> Result<Json<Vec<Airport>>, AppError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::Validation("Search query is required".to_string()))?;
    Ok(Json(state.airports.search(query).await))
}

fn validate_search(params: &SearchParams) -> Result<FlightQuery, AppError> {
    let origin = required(&params.origin);
    let destination = required(&params.destination);
    let date = required(&params.departure_date);

    let (origin, destination, date) = match (origin, destination, date) {
        (Some(o), Some(d), Some(t)) => (o, d, t),
        _ => {
            return Err(AppError::Validation(
                "Origin, destination, and departure date are required".to_string(),
            ))
        }
    };

    if origin.eq_ignore_ascii_case(destination) {
        return Err(AppError::Validation(
            "Origin and destination cannot be the same".to_string(),
        ));
    }

    let departure_date = date.parse::<NaiveDate>().map_err(|_| {
        AppError::Validation("Departure date must be formatted as YYYY-MM-DD".to_string())
    })?;

    Ok(FlightQuery {
        origin: origin.to_string(),
        destination: destination.to_string(),
        departure_date,
    })
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(origin: &str, destination: &str, date: &str) -> SearchParams {
        SearchParams {
            origin: Some(origin.to_string()),
            destination: Some(destination.to_string()),
            departure_date: Some(date.to_string()),
        }
    }

    #[test]
    fn accepts_a_complete_query() {
        let query = validate_search(&params(" JFK ", "LAX", "2026-09-01")).unwrap();
        assert_eq!(query.origin, "JFK");
        assert_eq!(query.destination, "LAX");
        assert_eq!(query.departure_date.to_string(), "2026-09-01");
    }

    #[test]
    fn rejects_missing_parameters() {
        let mut missing = params("JFK", "LAX", "2026-09-01");
        missing.destination = None;
        assert!(matches!(validate_search(&missing), Err(AppError::Validation(_))));

        let mut blank = params("JFK", "LAX", "2026-09-01");
        blank.origin = Some("   ".to_string());
        assert!(matches!(validate_search(&blank), Err(AppError::Validation(_))));
    }

    #[test]
    fn rejects_identical_origin_and_destination() {
        let result = validate_search(&params("JFK", "jfk", "2026-09-01"));
        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("cannot be the same")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unparseable_dates() {
        assert!(matches!(
            validate_search(&params("JFK", "LAX", "09/01/2026")),
            Err(AppError::Validation(_))
        ));
    }
}
