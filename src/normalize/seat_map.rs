use super::{backend_message, non_empty};
use crate::error::AdapterError;
use crate::models::{Seat, SeatMap};
use crate::tree::{as_sequence, find_root, ResponseTree};
use tracing::debug;

pub const RESPONSE_ROOTS: &[&str] = &["REZMax_GetBusSeatsRS", "REZMax_getBusSeatsRS"];

pub const SEAT_OCCUPIED: &str = "1";

pub fn normalize(tree: &ResponseTree) -> Result<SeatMap, AdapterError> {
    let root = find_root(tree, RESPONSE_ROOTS)
        .ok_or_else(|| AdapterError::shape("unrecognized response shape", tree.keys()))?;

    let seating = root.path(&["Bus", "Seats"]).ok_or_else(|| {
        AdapterError::SeatMapUnavailable(match backend_message(root) {
            Some(message) => format!("no seat map available: {}", message),
            None => "no seat map available".to_string(),
        })
    })?;

    let mut seats = Vec::new();
    // Row numbers come from position, the backend sends none
    for (index, row) in as_sequence(seating.get("Row")).into_iter().enumerate() {
        for entry in as_sequence(row.get("Seat")) {
            let Some(number) = entry.field("N").filter(|n| non_empty(n)) else {
                continue;
            };
            seats.push(Seat {
                number: number.to_string(),
                occupied: entry.field("O") == Some(SEAT_OCCUPIED),
                row: index + 1,
            });
        }
    }

    let map = SeatMap::new(seats);
    debug!(
        total = map.total_seats(),
        available = map.available_numbers().len(),
        "normalized seat map"
    );
    Ok(map)
}
