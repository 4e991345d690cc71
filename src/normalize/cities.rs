use super::backend_message;
use crate::error::AdapterError;
use crate::models::City;
use crate::tree::{as_sequence, find_root, ResponseTree};
use tracing::debug;

// The backend has answered with both casings
pub const RESPONSE_ROOTS: &[&str] = &["REZMax_getDepartureCitiesRS", "REZMax_GetDepartureCitiesRS"];

pub fn normalize(tree: &ResponseTree) -> Result<Vec<City>, AdapterError> {
    let root = find_root(tree, RESPONSE_ROOTS)
        .ok_or_else(|| AdapterError::shape("departure cities response missing", tree.keys()))?;

    if root.get("Success").is_none() {
        return Err(match backend_message(root) {
            Some(message) => AdapterError::BackendRejected(message),
            None => AdapterError::shape("departure cities without Success marker", root.keys()),
        });
    }

    let cities: Vec<City> = as_sequence(root.path(&["CityList", "City"]))
        .into_iter()
        .map(|entry| City {
            id: entry.field("Id").unwrap_or_default().to_string(),
            name: entry.field("Name").unwrap_or_default().to_string(),
            region: entry.field("RegionName").unwrap_or_default().to_string(),
        })
        .collect();

    debug!(count = cities.len(), "normalized departure cities");
    Ok(cities)
}
