use super::{backend_message, non_empty};
use crate::config::AdapterConfig;
use crate::error::AdapterError;
use crate::models::{TripOption, PRICE_NOT_AVAILABLE};
use crate::tree::{as_sequence, find_root, Node, ResponseTree};
use chrono::NaiveDateTime;
use tracing::{debug, info};

pub const RESPONSE_ROOTS: &[&str] = &["REZMax_getBusAvailRS", "REZMax_GetBusAvailRS"];

// Shorter container first
const OPTION_PATHS: &[&[&str]] = &[
    &["Options", "Option"],
    &["OriginDestinationOptions", "OriginDestinationOption"],
];

/// Passenger type code meaning "any passenger".
pub const ANY_PASSENGER: &str = "*";

pub fn normalize(tree: &ResponseTree, config: &AdapterConfig) -> Result<Vec<TripOption>, AdapterError> {
    let root = find_root(tree, RESPONSE_ROOTS)
        .ok_or_else(|| AdapterError::shape("backend returned no data", tree.keys()))?;

    let info = root.get("OriginDestinationInformation");
    if root.get("Success").is_none() {
        match (backend_message(root), info) {
            (Some(message), _) if config.is_empty_result_message(&message) => {
                info!(warning = %message, "backend reports no trips for the route");
                return Ok(Vec::new());
            }
            (Some(message), _) => return Err(AdapterError::BackendRejected(message)),
            // Older responses omit the marker but still carry the data
            (None, Some(_)) => debug!("bus availability without Success marker"),
            (None, None) => {
                return Err(AdapterError::shape(
                    "bus availability without Success marker",
                    root.keys(),
                ))
            }
        }
    }

    let info = info.ok_or_else(|| {
        AdapterError::shape("missing OriginDestinationInformation", root.keys())
    })?;

    let options = OPTION_PATHS.iter().find_map(|path| info.path(path));
    let candidates = as_sequence(options);
    let trips: Vec<TripOption> = candidates
        .iter()
        .filter_map(|option| trip_option(option, config))
        .collect();

    debug!(
        candidates = candidates.len(),
        trips = trips.len(),
        "normalized bus availability"
    );
    Ok(trips)
}

fn trip_option(option: &Node, config: &AdapterConfig) -> Option<TripOption> {
    // Options without an OptionId are dropped intentionally, trip details need it
    let option_id = option.field("OptionId").filter(|id| non_empty(id))?;

    // Multi-leg itineraries are displayed by their first leg only
    let segment = as_sequence(option.get("Segment")).into_iter().next()?;

    let tickets = as_sequence(segment.get("TicketAvail"));
    let ticket = tickets
        .iter()
        .find(|ticket| ticket.field("PassengerType") == Some(ANY_PASSENGER))
        .or_else(|| tickets.first())
        .copied();

    let carrier = segment
        .path(&["MarketingBusline", "CompanyName"])
        .and_then(Node::text)
        .filter(|name| non_empty(name))
        .unwrap_or(config.agent_sine.as_str());
    let price = ticket
        .and_then(|t| t.field("Price"))
        .filter(|price| non_empty(price))
        .unwrap_or(PRICE_NOT_AVAILABLE);
    let currency = ticket
        .and_then(|t| t.field("Currency"))
        .filter(|currency| non_empty(currency))
        .unwrap_or(config.iso_currency.as_str());

    Some(TripOption {
        option_id: option_id.to_string(),
        departure_time: clock_time(segment.field("DepartureDateTime")),
        arrival_time: clock_time(segment.field("ArrivalDateTime")),
        carrier: carrier.to_string(),
        price: price.to_string(),
        currency: currency.to_string(),
    })
}

// "2024-05-01T07:30:00" -> "07:30"
fn clock_time(value: Option<&str>) -> Option<String> {
    let raw = value?.trim();

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(timestamp.format("%H:%M").to_string());
        }
    }

    let (_, time) = raw.split_once('T')?;
    let time: String = time.chars().take(5).collect();
    (!time.is_empty()).then_some(time)
}
