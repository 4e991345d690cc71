// Ticketing service: envelope -> transport -> response tree -> normalizer.
// Stateless between calls; any number of operations may run concurrently.

use crate::config::AdapterConfig;
use crate::envelope::{EnvelopeBuilder, RequestEnvelope};
use crate::error::{AdapterError, ClientError};
use crate::models::{City, SearchQuery, SeatMap, SeatingResolution, TripDetails, TripOption};
use crate::normalize::{cities, search, seat_map, trip_details};
use crate::pipeline::{self, SeatingFailure, TripLookup};
use crate::transport::{HttpTransport, Transport};
use crate::tree::ResponseTree;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Plain-text answer the backend sends for a command it does not know.
pub const UNKNOWN_COMMAND_MARKER: &str = "Comanda necunoscuta";

#[derive(Clone)]
pub struct TicketingService {
    config: Arc<AdapterConfig>,
    envelopes: EnvelopeBuilder,
    transport: Arc<dyn Transport>,
}

impl TicketingService {
    pub fn new(config: AdapterConfig, transport: Arc<dyn Transport>) -> Self {
        let config = Arc::new(config);
        Self {
            envelopes: EnvelopeBuilder::new(config.clone()),
            config,
            transport,
        }
    }

    /// Service over the HTTP transport described by `config`.
    pub fn connect(config: AdapterConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    async fn exchange(&self, envelope: RequestEnvelope) -> Result<ResponseTree, AdapterError> {
        let operation = envelope.operation();
        let started = Instant::now();

        let body = self.transport.post(&envelope).await.map_err(|e| {
            warn!(%operation, error = %e, "transport failed");
            e
        })?;

        let text = std::str::from_utf8(&body).map_err(|e| {
            AdapterError::UpstreamUnavailable(format!("response is not UTF-8: {}", e))
        })?;

        if text.trim().is_empty() {
            warn!(%operation, "empty response body");
            return Err(AdapterError::UpstreamUnavailable(
                "backend returned an empty body".to_string(),
            ));
        }
        if text.contains(UNKNOWN_COMMAND_MARKER) {
            warn!(%operation, body = text, "backend rejected the command");
            return Err(AdapterError::UpstreamUnavailable(format!(
                "backend does not recognise {}: {}",
                operation.request_tag(),
                text.trim()
            )));
        }

        let tree = ResponseTree::parse(text)?;
        debug!(
            %operation,
            elapsed_ms = started.elapsed().as_millis() as u64,
            roots = ?tree.keys(),
            "exchange complete"
        );
        Ok(tree)
    }

    pub async fn list_cities(&self) -> Result<Vec<City>, AdapterError> {
        let tree = self.exchange(self.envelopes.departure_cities()).await?;
        cities::normalize(&tree)
    }

    pub async fn search_trips(&self, query: &SearchQuery) -> Result<Vec<TripOption>, AdapterError> {
        info!(
            origin = %query.origin_id,
            destination = %query.destination_id,
            date = %query.date,
            seats = query.seat_count,
            "searching trips"
        );
        let tree = self.exchange(self.envelopes.bus_avail(query)).await?;
        search::normalize(&tree, &self.config)
    }

    pub async fn trip_details(&self, option_id: &str, date: &str) -> Result<TripDetails, AdapterError> {
        let tree = self
            .exchange(self.envelopes.trip_details(option_id, date))
            .await?;
        trip_details::normalize(&tree, date)
    }

    pub async fn seat_map(&self, link_id: &str, date: &str) -> Result<SeatMap, AdapterError> {
        let tree = self.exchange(self.envelopes.bus_seats(link_id, date)).await?;
        seat_map::normalize(&tree)
    }

    pub async fn resolve_seating(
        &self,
        option_id: &str,
        date: &str,
    ) -> Result<SeatingResolution, SeatingFailure> {
        pipeline::resolve_seating(self, option_id, date).await
    }
}

#[async_trait]
impl TripLookup for TicketingService {
    async fn trip_details(&self, option_id: &str, date: &str) -> Result<TripDetails, AdapterError> {
        TicketingService::trip_details(self, option_id, date).await
    }

    async fn seat_map(&self, link_id: &str, date: &str) -> Result<SeatMap, AdapterError> {
        TicketingService::seat_map(self, link_id, date).await
    }
}
