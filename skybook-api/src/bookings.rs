use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use skybook_core::booking::BookingFilter;
use skybook_core::{BookingRecord, FlightData, FlightId, NewBooking};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", post(create_booking).get(list_bookings))
        .route("/api/bookings/reference/{reference}", get(get_booking))
        .route("/api/bookings/cancel/{reference}", put(cancel_booking))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingBody {
    flight_id: Option<FlightId>,
    passenger_name: Option<String>,
    passenger_email: Option<String>,
    passenger_phone: Option<String>,
    seats: Option<i32>,
    /// Required when `flight_id` does not name an existing catalog
    /// flight; the server materializes the flight from this payload.
    flight_data: Option<FlightData>,
}

async fn create_booking(
    State(state): State<AppState>,
    Json(body): Json<CreateBookingBody>,
) -> Result<(StatusCode, Json<BookingRecord>), AppError> {
    let new = validate_create(body)?;
    let record = state.bookings.create(&new).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListParams {
    email: Option<String>,
    booking_reference: Option<String>,
}

async fn list_bookings(
    State(state): State<AppState>,
    Query(params): Query<BookingListParams>,
) -> Result<Json<Vec<BookingRecord>>, AppError> {
    let filter = BookingFilter {
        email: params.email,
        reference: params.booking_reference,
    };
    let bookings = state.bookings.list(&filter).await?;
    Ok(Json(bookings))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<BookingRecord>, AppError> {
    let booking = state
        .bookings
        .find_by_reference(&reference)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
    Ok(Json(booking))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<Value>, AppError> {
    let booking = state.bookings.cancel(&reference).await?;
    Ok(Json(json!({
        "message": "Booking cancelled successfully",
        "booking": booking,
    })))
}

fn validate_create(body: CreateBookingBody) -> Result<NewBooking, AppError> {
    let missing_required = body.flight_id.is_none()
        || body.seats.is_none()
        || non_empty(&body.passenger_name).is_none()
        || non_empty(&body.passenger_email).is_none();
    if missing_required {
        return Err(AppError::Validation(
            "Flight ID, passenger name, email, and seats are required".to_string(),
        ));
    }

    let seats = body.seats.unwrap_or_default();
    if seats <= 0 {
        return Err(AppError::Validation(
            "Seats must be a positive number".to_string(),
        ));
    }

    Ok(NewBooking {
        flight: body.flight_id.unwrap_or(FlightId::Catalog(0)),
        passenger_name: body.passenger_name.unwrap_or_default().trim().to_string(),
        passenger_email: body.passenger_email.unwrap_or_default().trim().to_string(),
        passenger_phone: body
            .passenger_phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string),
        seats,
        flight_data: body.flight_data,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> CreateBookingBody {
        CreateBookingBody {
            flight_id: Some(FlightId::Catalog(7)),
            passenger_name: Some("Ada Lovelace".to_string()),
            passenger_email: Some("ada@example.com".to_string()),
            passenger_phone: Some("  ".to_string()),
            seats: Some(2),
            flight_data: None,
        }
    }

    #[test]
    fn accepts_a_complete_body_and_normalizes_phone() {
        let new = validate_create(body()).unwrap();
        assert_eq!(new.passenger_name, "Ada Lovelace");
        assert_eq!(new.seats, 2);
        // Blank phone collapses to none.
        assert!(new.passenger_phone.is_none());
    }

    #[test]
    fn rejects_missing_required_fields() {
        let strips: [fn(&mut CreateBookingBody); 4] = [
            |b| b.flight_id = None,
            |b| b.passenger_name = Some(String::new()),
            |b| b.passenger_email = None,
            |b| b.seats = None,
        ];
        for strip in strips {
            let mut incomplete = body();
            strip(&mut incomplete);
            assert!(matches!(
                validate_create(incomplete),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[test]
    fn rejects_non_positive_seat_counts() {
        for seats in [0, -3] {
            let mut invalid = body();
            invalid.seats = Some(seats);
            match validate_create(invalid) {
                Err(AppError::Validation(msg)) => assert!(msg.contains("positive")),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }
}
