use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use skybook_core::LookupError;

/// Autocomplete entry for the airport pickers.
#[derive(Debug, Clone, Serialize)]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub city: String,
}

/// External airport directory behind the autocomplete.
#[async_trait]
pub trait AirportsSource: Send + Sync {
    async fn search_airports(&self, query: &str) -> Result<Vec<Airport>, LookupError>;
}

/// Airports always available to the autocomplete, whether or not the
/// external directory answers.
const FALLBACK_AIRPORTS: &[(&str, &str, &str)] = &[
    ("ATL", "Hartsfield-Jackson Atlanta International", "Atlanta"),
    ("BOS", "Boston Logan International", "Boston"),
    ("CDG", "Paris Charles de Gaulle", "Paris"),
    ("DEN", "Denver International", "Denver"),
    ("DFW", "Dallas/Fort Worth International", "Dallas"),
    ("DXB", "Dubai International", "Dubai"),
    ("FRA", "Frankfurt am Main", "Frankfurt"),
    ("HND", "Tokyo Haneda", "Tokyo"),
    ("JFK", "John F. Kennedy International", "New York"),
    ("LAS", "Harry Reid International", "Las Vegas"),
    ("LAX", "Los Angeles International", "Los Angeles"),
    ("LHR", "London Heathrow", "London"),
    ("MAD", "Adolfo Suárez Madrid-Barajas", "Madrid"),
    ("MIA", "Miami International", "Miami"),
    ("ORD", "Chicago O'Hare International", "Chicago"),
    ("PHX", "Phoenix Sky Harbor International", "Phoenix"),
    ("SEA", "Seattle-Tacoma International", "Seattle"),
    ("SFO", "San Francisco International", "San Francisco"),
    ("SIN", "Singapore Changi", "Singapore"),
    ("YYZ", "Toronto Pearson International", "Toronto"),
];

/// Airport autocomplete backed by the static list, enriched by the
/// external directory when it is configured and reachable.
pub struct AirportDirectory {
    external: Option<Arc<dyn AirportsSource>>,
}

impl AirportDirectory {
    pub fn new(external: Option<Arc<dyn AirportsSource>>) -> Self {
        Self { external }
    }

    /// Static matches first, then external results with duplicate
    /// IATA codes dropped. External failure degrades to the static
    /// list alone.
    pub async fn search(&self, query: &str) -> Vec<Airport> {
        let mut results = static_matches(query);

        if let Some(source) = &self.external {
            match source.search_airports(query).await {
                Ok(remote) => {
                    for airport in remote {
                        if !results.iter().any(|a| a.code == airport.code) {
                            results.push(airport);
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, "airport directory lookup failed, serving static list");
                }
            }
        }

        results
    }
}

fn static_matches(query: &str) -> Vec<Airport> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    FALLBACK_AIRPORTS
        .iter()
        .filter(|(code, name, city)| {
            code.to_lowercase().contains(&needle)
                || name.to_lowercase().contains(&needle)
                || city.to_lowercase().contains(&needle)
        })
        .map(|(code, name, city)| Airport {
            code: (*code).to_string(),
            name: (*name).to_string(),
            city: (*city).to_string(),
        })
        .collect()
}
