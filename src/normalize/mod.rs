// Response normalizers, one per operation. Success detection differs:
// cities and search look for a `Success` node, trip details for the segment
// list, the seat map for the `Bus/Seats` block. A "no trips" answer is an
// empty success.

pub mod cities;
pub mod search;
pub mod seat_map;
pub mod trip_details;

use crate::tree::{as_sequence, Node};

const MESSAGE_PATHS: &[&[&str]] = &[
    &["Errors", "Error"],
    &["Warnings", "Warning"],
    &["Error"],
    &["Warning"],
];

/// First human readable message in the response's error or warning blocks.
pub(crate) fn backend_message(root: &Node) -> Option<String> {
    MESSAGE_PATHS
        .iter()
        .flat_map(|path| as_sequence(root.path(path)))
        .find_map(|entry| {
            entry
                .field("ShortText")
                .or_else(|| entry.text())
                .map(str::trim)
                .filter(|message| !message.is_empty())
                .map(str::to_string)
        })
}

pub(crate) fn non_empty(value: &str) -> bool {
    !value.trim().is_empty()
}
