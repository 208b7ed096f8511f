use thiserror::Error;

/// Business-rule and persistence failures of the booking ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Flight not found")]
    FlightNotFound,

    #[error("Booking not found")]
    BookingNotFound,

    #[error("Not enough seats available")]
    InsufficientSeats { requested: i32, available: i32 },

    #[error("Booking is already cancelled")]
    AlreadyCancelled,

    #[error("Failed to generate booking reference")]
    ReferenceExhausted,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Failure of a single flight-lookup tier. The fallback chain absorbs
/// these; clients never see them.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("upstream rejected the request: {0}")]
    Rejected(String),

    #[error("no flights available from this source")]
    Empty,

    #[error("catalog error: {0}")]
    Catalog(#[from] sqlx::Error),
}
