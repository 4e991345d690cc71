// Typed results produced by the normalizers
use serde::{Deserialize, Serialize};

/// Price placeholder when the backend offers no usable ticket.
pub const PRICE_NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct City {
    pub id: String,
    pub name: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripOption {
    pub option_id: String,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    pub carrier: String,
    pub price: String,
    pub currency: String,
}

impl TripOption {
    pub fn has_price(&self) -> bool {
        self.price != PRICE_NOT_AVAILABLE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDetails {
    /// Identifier of the concrete trip instance. Every call after the trip
    /// details lookup must use this one, never the search option id.
    pub link_id: String,
    pub departure_date: String,
    pub seat_select_allowed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub number: String,
    pub occupied: bool,
    pub row: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMap {
    total_seats: usize,
    available_numbers: Vec<String>,
    seats: Vec<Seat>,
}

impl SeatMap {
    pub fn new(seats: Vec<Seat>) -> Self {
        let available_numbers = seats
            .iter()
            .filter(|s| !s.occupied)
            .map(|s| s.number.clone())
            .collect();

        Self {
            total_seats: seats.len(),
            available_numbers,
            seats,
        }
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn total_seats(&self) -> usize {
        self.total_seats
    }

    pub fn available_numbers(&self) -> &[String] {
        &self.available_numbers
    }
}

// Outcome of the details -> seats pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatingResolution {
    pub link_id: String,
    pub departure_date: String,
    pub auto_allocation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_map: Option<SeatMap>,
}

impl SeatingResolution {
    pub fn seats(&self) -> &[Seat] {
        self.seat_map
            .as_ref()
            .map(|map| map.seats())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub origin_id: String,
    pub destination_id: String,
    /// Passed to the backend verbatim.
    pub date: String,
    #[serde(default = "default_seat_count")]
    pub seat_count: u32,
}

fn default_seat_count() -> u32 {
    1
}

impl SearchQuery {
    pub fn new(
        origin_id: impl Into<String>,
        destination_id: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            origin_id: origin_id.into(),
            destination_id: destination_id.into(),
            date: date.into(),
            seat_count: default_seat_count(),
        }
    }

    pub fn with_seats(mut self, seat_count: u32) -> Self {
        self.seat_count = seat_count;
        self
    }
}
