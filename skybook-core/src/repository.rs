use async_trait::async_trait;

use crate::error::{LedgerError, LookupError};
use crate::flight::{Flight, FlightQuery};

/// Search over the persisted flight catalog. Implemented by the
/// Postgres store; the lookup chain consumes it as one of its tiers.
#[async_trait]
pub trait FlightCatalog: Send + Sync {
    async fn search(&self, query: &FlightQuery) -> Result<Vec<Flight>, LedgerError>;
}

/// One tier of the flight lookup fallback chain. A tier either yields
/// a non-empty result set or a typed failure; returning `Ok(vec![])`
/// is a contract violation (tiers signal emptiness with
/// `LookupError::Empty` so the chain can advance).
#[async_trait]
pub trait FlightSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &FlightQuery) -> Result<Vec<Flight>, LookupError>;
}
