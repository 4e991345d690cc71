use super::non_empty;
use crate::error::AdapterError;
use crate::models::TripDetails;
use crate::tree::{as_sequence, find_root, ResponseTree};
use tracing::debug;

// No casing drift observed for this one
pub const RESPONSE_ROOTS: &[&str] = &["REZMax_getTripDetailsRS"];

pub const SEAT_SELECT_ENABLED: &str = "1";

/// Resolves the link id of the trip. `requested_date` is used when the
/// backend leaves the departure date out.
pub fn normalize(tree: &ResponseTree, requested_date: &str) -> Result<TripDetails, AdapterError> {
    let root = find_root(tree, RESPONSE_ROOTS)
        .ok_or_else(|| unresolved("trip details response missing"))?;

    let segment = as_sequence(root.path(&["Segments", "Segment"]))
        .into_iter()
        .next()
        .ok_or_else(|| unresolved("no segment in trip details"))?;

    let link_id = segment
        .field("LinkId")
        .filter(|id| non_empty(id))
        .ok_or_else(|| unresolved("segment without LinkId"))?;

    let departure_date = segment
        .field("DepartureDate")
        .filter(|date| non_empty(date))
        .unwrap_or(requested_date);

    let seat_select_allowed = segment.field("SeatSelect") == Some(SEAT_SELECT_ENABLED);

    debug!(link_id, seat_select_allowed, "resolved trip details");

    Ok(TripDetails {
        link_id: link_id.to_string(),
        departure_date: departure_date.to_string(),
        seat_select_allowed,
    })
}

fn unresolved(detail: &str) -> AdapterError {
    AdapterError::DomainValidation(format!("cannot resolve trip: {}", detail))
}
