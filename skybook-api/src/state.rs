use std::sync::Arc;

use skybook_lookup::{AirportDirectory, LookupChain};
use skybook_store::{DbClient, PgBookingRepository, PgFlightRepository};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbClient>,
    pub flights: Arc<PgFlightRepository>,
    pub bookings: Arc<PgBookingRepository>,
    pub lookup: Arc<LookupChain>,
    pub airports: Arc<AirportDirectory>,
}
