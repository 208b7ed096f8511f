use async_trait::async_trait;
use sqlx::PgPool;

use skybook_core::{Flight, FlightCatalog, FlightQuery, LedgerError};

pub(crate) const FLIGHT_COLUMNS: &str = "id, flight_number, airline, origin, destination, \
     departure_time, arrival_time, price, total_seats, available_seats";

pub struct PgFlightRepository {
    pool: PgPool,
}

impl PgFlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All flights still open for booking, soonest departure first.
    pub async fn list_available(&self) -> Result<Vec<Flight>, LedgerError> {
        let sql = format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights \
             WHERE available_seats > 0 ORDER BY departure_time ASC"
        );
        let flights = sqlx::query_as::<_, Flight>(&sql).fetch_all(&self.pool).await?;
        Ok(flights)
    }

    pub async fn find(&self, id: i64) -> Result<Option<Flight>, LedgerError> {
        let sql = format!("SELECT {FLIGHT_COLUMNS} FROM flights WHERE id = $1");
        let flight = sqlx::query_as::<_, Flight>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(flight)
    }

    /// Case-insensitive route search restricted to the departure date.
    pub async fn search(&self, query: &FlightQuery) -> Result<Vec<Flight>, LedgerError> {
        let sql = format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights \
             WHERE LOWER(origin) = LOWER($1) \
               AND LOWER(destination) = LOWER($2) \
               AND departure_time::date = $3 \
               AND available_seats > 0 \
             ORDER BY departure_time ASC"
        );
        let flights = sqlx::query_as::<_, Flight>(&sql)
            .bind(query.origin.trim())
            .bind(query.destination.trim())
            .bind(query.departure_date)
            .fetch_all(&self.pool)
            .await?;
        Ok(flights)
    }

    /// Distinct origin/destination values across the catalog, sorted.
    pub async fn airports(&self) -> Result<Vec<String>, LedgerError> {
        let airports = sqlx::query_scalar::<_, String>(
            "SELECT origin AS airport FROM flights \
             UNION \
             SELECT destination FROM flights \
             ORDER BY 1 ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(airports)
    }
}

#[async_trait]
impl FlightCatalog for PgFlightRepository {
    async fn search(&self, query: &FlightQuery) -> Result<Vec<Flight>, LedgerError> {
        PgFlightRepository::search(self, query).await
    }
}
