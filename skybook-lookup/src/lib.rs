//! Flight lookup with ordered fallback: external API, then catalog,
//! then synthetic samples. Tier failures are logged and absorbed.

use std::sync::Arc;

use tracing::{debug, warn};

use skybook_core::{Flight, FlightQuery, FlightSource};

pub mod airports;
pub mod aviationstack;
pub mod catalog;
pub mod sample;

pub use airports::{AirportDirectory, AirportsSource};
pub use aviationstack::AviationStack;
pub use catalog::CatalogSource;
pub use sample::SampleSource;

pub struct LookupChain {
    sources: Vec<Arc<dyn FlightSource>>,
}

impl LookupChain {
    pub fn new(sources: Vec<Arc<dyn FlightSource>>) -> Self {
        Self { sources }
    }

    /// Try each tier in order; the first non-empty result wins. An
    /// empty list comes back only when every tier fails.
    pub async fn search(&self, query: &FlightQuery) -> Vec<Flight> {
        for source in &self.sources {
            match source.search(query).await {
                Ok(flights) if !flights.is_empty() => {
                    debug!(source = source.name(), count = flights.len(), "lookup tier served");
                    return flights;
                }
                Ok(_) => {
                    warn!(source = source.name(), "lookup tier returned nothing, falling back");
                }
                Err(err) => {
                    warn!(source = source.name(), error = %err, "lookup tier failed, falling back");
                }
            }
        }
        Vec::new()
    }
}

/// Deterministic 64-bit seed for synthesized ids, prices and seat
/// counts. FNV-1a, so external flights keep the same synthetic id
/// across searches.
pub(crate) fn stable_seed(input: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in input.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Synthetic flight ids are negative so they can never collide with
/// BIGSERIAL catalog ids.
pub(crate) fn synthetic_id(seed: u64) -> i64 {
    -(((seed % 8_999_999_999) as i64) + 1_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use skybook_core::LookupError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn query() -> FlightQuery {
        FlightQuery {
            origin: "JFK".into(),
            destination: "LAX".into(),
            departure_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        }
    }

    struct Scripted {
        name: &'static str,
        outcome: Result<usize, fn() -> LookupError>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn flights(name: &'static str, count: usize) -> Arc<Self> {
            Arc::new(Self { name, outcome: Ok(count), calls: AtomicUsize::new(0) })
        }

        fn failing(name: &'static str, err: fn() -> LookupError) -> Arc<Self> {
            Arc::new(Self { name, outcome: Err(err), calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl FlightSource for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn search(&self, query: &FlightQuery) -> Result<Vec<Flight>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                Ok(count) => Ok(sample::generate(query).into_iter().take(*count).collect()),
                Err(err) => Err(err()),
            }
        }
    }

    #[tokio::test]
    async fn first_successful_tier_short_circuits() {
        let first = Scripted::flights("first", 2);
        let second = Scripted::flights("second", 1);
        let chain = LookupChain::new(vec![first.clone(), second.clone()]);

        let flights = chain.search(&query()).await;
        assert_eq!(flights.len(), 2);
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_tier_falls_through() {
        let upstream = Scripted::failing("upstream", || {
            LookupError::Upstream("connection timed out".into())
        });
        let empty = Scripted::failing("catalog", || LookupError::Empty);
        let sample = Scripted::flights("sample", 3);
        let chain = LookupChain::new(vec![upstream.clone(), empty.clone(), sample]);

        let flights = chain.search(&query()).await;
        assert_eq!(flights.len(), 3);
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);
        assert_eq!(empty.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn all_tiers_failing_yields_empty_list() {
        let chain = LookupChain::new(vec![
            Scripted::failing("upstream", || LookupError::Rejected("no subscription".into())),
            Scripted::failing("catalog", || LookupError::Empty),
        ]);

        assert!(chain.search(&query()).await.is_empty());
    }

    #[test]
    fn seeds_are_stable_and_ids_negative() {
        assert_eq!(stable_seed("SB101"), stable_seed("SB101"));
        assert_ne!(stable_seed("SB101"), stable_seed("SB102"));
        assert!(synthetic_id(stable_seed("SB101")) < 0);
    }
}
