// RezMax ticketing proxy: XML envelopes out, normalized JSON-ready models back

pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod service;
pub mod transport;
pub mod tree;

// Re-export key types for convenience
pub use config::AdapterConfig;
pub use dispatch::{Dispatcher, OperationRequest, OperationResponse, Payload};
pub use envelope::{EnvelopeBuilder, Operation, RequestEnvelope};
pub use error::{AdapterError, ClientError, FailureKind};
pub use models::{City, SearchQuery, Seat, SeatMap, SeatingResolution, TripDetails, TripOption};
pub use pipeline::{resolve_seating, SeatingFailure, TripLookup};
pub use service::TicketingService;
pub use transport::{HttpTransport, Transport};
pub use tree::{as_sequence, find_root, Node, ResponseTree};
