use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Duration;

use skybook_core::{Flight, FlightQuery, FlightSource, LookupError};

use crate::{stable_seed, synthetic_id};

const AIRLINES: [(&str, &str); 4] = [
    ("SkyBook Air", "SB"),
    ("Coastal Wings", "CW"),
    ("Northvale", "NV"),
    ("Atlas Regional", "AR"),
];

/// Last tier of the lookup chain: synthesizes plausible flights for
/// the requested route and date. Deterministic per (route, date) so a
/// client can search, pick a flight, and book it by the same synthetic
/// id later.
pub struct SampleSource;

#[async_trait]
impl FlightSource for SampleSource {
    fn name(&self) -> &'static str {
        "sample"
    }

    async fn search(&self, query: &FlightQuery) -> Result<Vec<Flight>, LookupError> {
        Ok(generate(query))
    }
}

pub fn generate(query: &FlightQuery) -> Vec<Flight> {
    let route_seed = stable_seed(&format!(
        "{}|{}|{}",
        query.origin.to_uppercase(),
        query.destination.to_uppercase(),
        query.departure_date
    ));
    let count = 3 + (route_seed % 3) as usize;

    let mut flights = Vec::with_capacity(count);
    for i in 0..count {
        let seed = route_seed.wrapping_add(stable_seed(&i.to_string()));
        let (airline, code) = AIRLINES[(seed % AIRLINES.len() as u64) as usize];
        let flight_number = format!("{}{}", code, 100 + seed % 800);

        // Departures spread through the day on the quarter hour.
        let hour = (6 + (seed >> 8) % 14) as u32;
        let minute = ((seed >> 16) % 4) as u32 * 15;
        let departure_time = query
            .departure_date
            .and_hms_opt(hour, minute, 0)
            .unwrap_or_else(|| query.departure_date.and_hms_opt(12, 0, 0).expect("valid time"))
            .and_utc();
        let arrival_time = departure_time + Duration::minutes((90 + (seed >> 24) % 270) as i64);

        let price_cents = (8_900 + (seed >> 32) % 36_000) as i64;
        let total_seats = 120 + ((seed >> 40) % 4) as i32 * 30;
        let available_seats = 20 + ((seed >> 48) % (total_seats as u64 - 20)) as i32;

        flights.push(Flight {
            id: synthetic_id(stable_seed(&format!("{flight_number}|{}", query.departure_date))),
            flight_number,
            airline: airline.to_string(),
            origin: query.origin.to_uppercase(),
            destination: query.destination.to_uppercase(),
            departure_time,
            arrival_time,
            price: BigDecimal::from(price_cents) / BigDecimal::from(100),
            total_seats,
            available_seats,
        });
    }

    flights.sort_by_key(|f| f.departure_time);
    flights
}
