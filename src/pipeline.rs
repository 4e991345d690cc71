// Trip resolution: trip details first, then the seat map only when the trip
// allows seat selection. The two calls are strictly sequential, the second
// one needs the link id produced by the first.

use crate::error::AdapterError;
use crate::models::{SeatMap, SeatingResolution, TripDetails};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

#[async_trait]
pub trait TripLookup: Send + Sync {
    async fn trip_details(&self, option_id: &str, date: &str) -> Result<TripDetails, AdapterError>;

    async fn seat_map(&self, link_id: &str, date: &str) -> Result<SeatMap, AdapterError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatingStage {
    ResolvingDetails,
    FetchingSeats(TripDetails),
    AutoAllocated(TripDetails),
    Done(SeatingResolution),
}

/// Pipeline failure. `link_id` is set once the trip has been resolved, so
/// the caller can keep it even when the seat map call fails.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{error}")]
pub struct SeatingFailure {
    pub link_id: Option<String>,
    #[source]
    pub error: AdapterError,
}

pub async fn resolve_seating<L>(
    lookup: &L,
    option_id: &str,
    date: &str,
) -> Result<SeatingResolution, SeatingFailure>
where
    L: TripLookup + ?Sized,
{
    let mut stage = SeatingStage::ResolvingDetails;

    loop {
        stage = match stage {
            SeatingStage::ResolvingDetails => {
                let details = lookup
                    .trip_details(option_id, date)
                    .await
                    .map_err(|error| SeatingFailure {
                        link_id: None,
                        error,
                    })?;

                if details.seat_select_allowed {
                    SeatingStage::FetchingSeats(details)
                } else {
                    SeatingStage::AutoAllocated(details)
                }
            }
            SeatingStage::FetchingSeats(details) => {
                let seat_map = match lookup
                    .seat_map(&details.link_id, &details.departure_date)
                    .await
                {
                    Ok(seat_map) => seat_map,
                    Err(error) => {
                        warn!(link_id = %details.link_id, %error, "seat map lookup failed");
                        return Err(SeatingFailure {
                            link_id: Some(details.link_id),
                            error,
                        });
                    }
                };

                SeatingStage::Done(SeatingResolution {
                    link_id: details.link_id,
                    departure_date: details.departure_date,
                    auto_allocation: false,
                    seat_map: Some(seat_map),
                })
            }
            SeatingStage::AutoAllocated(details) => {
                debug!(link_id = %details.link_id, "trip uses automatic seat allocation");
                SeatingStage::Done(SeatingResolution {
                    link_id: details.link_id,
                    departure_date: details.departure_date,
                    auto_allocation: true,
                    seat_map: None,
                })
            }
            SeatingStage::Done(resolution) => return Ok(resolution),
        };
    }
}
