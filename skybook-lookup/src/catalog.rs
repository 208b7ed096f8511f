use std::sync::Arc;

use async_trait::async_trait;

use skybook_core::{Flight, FlightCatalog, FlightQuery, FlightSource, LedgerError, LookupError};

/// Second tier of the lookup chain: the persisted catalog. Finding
/// nothing is a typed failure so the chain can fall through to the
/// sample generator.
pub struct CatalogSource {
    catalog: Arc<dyn FlightCatalog>,
}

impl CatalogSource {
    pub fn new(catalog: Arc<dyn FlightCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl FlightSource for CatalogSource {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn search(&self, query: &FlightQuery) -> Result<Vec<Flight>, LookupError> {
        let flights = self.catalog.search(query).await.map_err(|e| match e {
            LedgerError::Database(db) => LookupError::Catalog(db),
            other => LookupError::Upstream(other.to_string()),
        })?;

        if flights.is_empty() {
            return Err(LookupError::Empty);
        }
        Ok(flights)
    }
}
