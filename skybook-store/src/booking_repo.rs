use sqlx::{PgConnection, PgPool};
use tracing::info;

use skybook_core::booking::BookingFilter;
use skybook_core::flight::FlightData;
use skybook_core::{reference, BookingRecord, BookingStatus, Flight, LedgerError, NewBooking};

use crate::flight_repo::FLIGHT_COLUMNS;

/// Booking columns joined with the flight's descriptive fields; every
/// booking query selects this same shape.
const BOOKING_SELECT: &str = "SELECT b.id, b.booking_reference, b.flight_id, \
     b.passenger_name, b.passenger_email, b.passenger_phone, b.seats, \
     b.booking_date, b.status, \
     f.flight_number, f.airline, f.origin, f.destination, \
     f.departure_time, f.arrival_time, f.price \
     FROM bookings b JOIN flights f ON b.flight_id = f.id";

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a booking inside one transaction: lock the flight row,
    /// check availability, allocate a unique reference, insert the row
    /// and decrement the seat count. Any error before commit rolls the
    /// whole transaction back.
    pub async fn create(&self, new: &NewBooking) -> Result<BookingRecord, LedgerError> {
        self.create_with_generator(new, &reference::generate).await
    }

    /// Same as [`create`](Self::create) but with an injectable
    /// candidate generator, so the reference-exhaustion path can be
    /// exercised in tests.
    pub async fn create_with_generator(
        &self,
        new: &NewBooking,
        generate: &(dyn Fn() -> String + Sync),
    ) -> Result<BookingRecord, LedgerError> {
        let mut tx = self.pool.begin().await?;

        let locked = match new.flight.catalog_id() {
            Some(id) => lock_flight(&mut tx, id).await?,
            None => None,
        };

        // A flight sourced externally (or from the sample generator)
        // is materialized on first booking, with the requested seats
        // already deducted. An existing flight is checked and
        // decremented instead.
        let (flight_id, decrement) = match locked {
            Some(flight) => {
                if flight.available_seats < new.seats {
                    return Err(LedgerError::InsufficientSeats {
                        requested: new.seats,
                        available: flight.available_seats,
                    });
                }
                (flight.id, true)
            }
            None => {
                let data = new.flight_data.as_ref().ok_or(LedgerError::FlightNotFound)?;
                let id = materialize_flight(&mut tx, data, new.seats).await?;
                info!(flight_id = id, flight_number = %data.flight_number, "materialized external flight");
                (id, false)
            }
        };

        let booking_reference = allocate_reference(&mut tx, generate).await?;

        let booking_id: i64 = sqlx::query_scalar(
            "INSERT INTO bookings \
             (booking_reference, flight_id, passenger_name, passenger_email, \
              passenger_phone, seats, booking_date, status) \
             VALUES ($1, $2, $3, $4, $5, $6, now(), $7) \
             RETURNING id",
        )
        .bind(&booking_reference)
        .bind(flight_id)
        .bind(&new.passenger_name)
        .bind(&new.passenger_email)
        .bind(&new.passenger_phone)
        .bind(new.seats)
        .bind(BookingStatus::Confirmed.as_str())
        .fetch_one(&mut *tx)
        .await?;

        if decrement {
            sqlx::query("UPDATE flights SET available_seats = available_seats - $1 WHERE id = $2")
                .bind(new.seats)
                .bind(flight_id)
                .execute(&mut *tx)
                .await?;
        }

        let record = fetch_record(&mut tx, booking_id)
            .await?
            .ok_or(LedgerError::BookingNotFound)?;

        tx.commit().await?;

        info!(reference = %record.booking_reference, flight_id, seats = new.seats, "booking created");
        Ok(record)
    }

    /// Cancel a booking by reference and restore its seats to the
    /// flight. Rejects unknown references and repeated cancellations;
    /// both leave the ledger untouched.
    pub async fn cancel(&self, booking_reference: &str) -> Result<BookingRecord, LedgerError> {
        let mut tx = self.pool.begin().await?;

        #[derive(sqlx::FromRow)]
        struct LockedBooking {
            id: i64,
            flight_id: i64,
            seats: i32,
            status: String,
        }

        let booking: Option<LockedBooking> = sqlx::query_as(
            "SELECT id, flight_id, seats, status FROM bookings \
             WHERE booking_reference = $1 FOR UPDATE",
        )
        .bind(booking_reference)
        .fetch_optional(&mut *tx)
        .await?;

        let booking = booking.ok_or(LedgerError::BookingNotFound)?;
        if booking.status == BookingStatus::Cancelled.as_str() {
            return Err(LedgerError::AlreadyCancelled);
        }

        // Serialize against concurrent bookings on the same flight.
        let _flight = lock_flight(&mut tx, booking.flight_id).await?;

        sqlx::query("UPDATE bookings SET status = $1 WHERE id = $2")
            .bind(BookingStatus::Cancelled.as_str())
            .bind(booking.id)
            .execute(&mut *tx)
            .await?;

        // Restores exactly the originally booked count, even if
        // total_seats was edited out-of-band in the meantime.
        sqlx::query("UPDATE flights SET available_seats = available_seats + $1 WHERE id = $2")
            .bind(booking.seats)
            .bind(booking.flight_id)
            .execute(&mut *tx)
            .await?;

        let record = fetch_record(&mut tx, booking.id)
            .await?
            .ok_or(LedgerError::BookingNotFound)?;

        tx.commit().await?;

        info!(reference = %booking_reference, seats = booking.seats, "booking cancelled");
        Ok(record)
    }

    /// List bookings, optionally narrowed by passenger email and/or
    /// reference, newest first.
    pub async fn list(&self, filter: &BookingFilter) -> Result<Vec<BookingRecord>, LedgerError> {
        let sql = format!(
            "{BOOKING_SELECT} \
             WHERE ($1::text IS NULL OR b.passenger_email = $1) \
               AND ($2::text IS NULL OR b.booking_reference = $2) \
             ORDER BY b.booking_date DESC"
        );
        let bookings = sqlx::query_as::<_, BookingRecord>(&sql)
            .bind(&filter.email)
            .bind(&filter.reference)
            .fetch_all(&self.pool)
            .await?;
        Ok(bookings)
    }

    pub async fn find_by_reference(
        &self,
        booking_reference: &str,
    ) -> Result<Option<BookingRecord>, LedgerError> {
        let sql = format!("{BOOKING_SELECT} WHERE b.booking_reference = $1");
        let booking = sqlx::query_as::<_, BookingRecord>(&sql)
            .bind(booking_reference)
            .fetch_optional(&self.pool)
            .await?;
        Ok(booking)
    }
}

/// `SELECT ... FOR UPDATE` on the flight row; concurrent bookings
/// against the same flight queue up behind this lock.
async fn lock_flight(conn: &mut PgConnection, id: i64) -> Result<Option<Flight>, LedgerError> {
    let sql = format!("SELECT {FLIGHT_COLUMNS} FROM flights WHERE id = $1 FOR UPDATE");
    let flight = sqlx::query_as::<_, Flight>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(flight)
}

/// Insert a flight the catalog has never seen, with the requested
/// seats already deducted (floored at zero).
async fn materialize_flight(
    conn: &mut PgConnection,
    data: &FlightData,
    seats_requested: i32,
) -> Result<i64, LedgerError> {
    let available_seats = (data.total_seats - seats_requested).max(0);
    let id = sqlx::query_scalar(
        "INSERT INTO flights \
         (flight_number, airline, origin, destination, departure_time, \
          arrival_time, price, total_seats, available_seats) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING id",
    )
    .bind(&data.flight_number)
    .bind(&data.airline)
    .bind(&data.origin)
    .bind(&data.destination)
    .bind(data.departure_time)
    .bind(data.arrival_time)
    .bind(&data.price)
    .bind(data.total_seats)
    .bind(available_seats)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Bounded retry around reference generation: up to
/// `reference::MAX_ATTEMPTS` candidates are checked against the ledger
/// before the operation fails with `ReferenceExhausted`.
async fn allocate_reference(
    conn: &mut PgConnection,
    generate: &(dyn Fn() -> String + Sync),
) -> Result<String, LedgerError> {
    for _ in 0..reference::MAX_ATTEMPTS {
        let candidate = generate();
        let taken: Option<i64> =
            sqlx::query_scalar("SELECT id FROM bookings WHERE booking_reference = $1")
                .bind(&candidate)
                .fetch_optional(&mut *conn)
                .await?;
        if taken.is_none() {
            return Ok(candidate);
        }
    }
    Err(LedgerError::ReferenceExhausted)
}

async fn fetch_record(
    conn: &mut PgConnection,
    booking_id: i64,
) -> Result<Option<BookingRecord>, LedgerError> {
    let sql = format!("{BOOKING_SELECT} WHERE b.id = $1");
    let record = sqlx::query_as::<_, BookingRecord>(&sql)
        .bind(booking_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(record)
}
