pub mod booking;
pub mod error;
pub mod flight;
pub mod reference;
pub mod repository;

pub use booking::{BookingRecord, BookingStatus, NewBooking};
pub use error::{LedgerError, LookupError};
pub use flight::{Flight, FlightData, FlightId, FlightQuery};
pub use repository::{FlightCatalog, FlightSource};
