// Request envelopes: the point-of-sale header plus one body per operation,
// serialized with quick-xml the same way the response structures are modelled.

use crate::config::AdapterConfig;
use crate::error::AdapterError;
use crate::models::SearchQuery;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    DepartureCities,
    BusAvail,
    TripDetails,
    BusSeats,
}

impl Operation {
    pub fn request_tag(&self) -> &'static str {
        match self {
            Operation::DepartureCities => "REZMax_getDepartureCitiesRQ",
            Operation::BusAvail => "REZMax_getBusAvailRQ",
            Operation::TripDetails => "REZMax_getTripDetailsRQ",
            // The backend only accepts the capitalised seat map command
            Operation::BusSeats => "REZMax_GetBusSeatsRQ",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::DepartureCities => "departure-cities",
            Operation::BusAvail => "bus-avail",
            Operation::TripDetails => "trip-details",
            Operation::BusSeats => "bus-seats",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointOfSale {
    pub agent_sine: String,
    pub city: String,
    pub iso_country: String,
    pub iso_currency: String,
    pub language: String,
    pub requestor_id: String,
    pub requestor_pass: String,
}

impl From<&AdapterConfig> for PointOfSale {
    fn from(config: &AdapterConfig) -> Self {
        Self {
            agent_sine: config.agent_sine.clone(),
            city: config.city.clone(),
            iso_country: config.iso_country.clone(),
            iso_currency: config.iso_currency.clone(),
            language: config.language.clone(),
            requestor_id: config.requestor_id.clone(),
            requestor_pass: config.requestor_pass.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    DepartureCities,
    BusAvail {
        seats: u32,
        departure_date: String,
        origin_code: String,
        destination_code: String,
    },
    TripDetails {
        option_id: String,
        departure_date: String,
    },
    BusSeats {
        link_id: String,
        date: String,
    },
}

/// A complete outbound request. Only [`EnvelopeBuilder`] creates these, so
/// every envelope carries the point-of-sale header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEnvelope {
    operation: Operation,
    pos: PointOfSale,
    body: RequestBody,
}

impl RequestEnvelope {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn point_of_sale(&self) -> &PointOfSale {
        &self.pos
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn to_xml(&self) -> Result<String, AdapterError> {
        let request = XmlRequest::from(self);
        let xml = quick_xml::se::to_string_with_root(self.operation.request_tag(), &request)
            .map_err(|e| AdapterError::Internal(format!("cannot encode envelope: {}", e)))?;

        Ok(format!("{}{}", XML_DECLARATION, xml))
    }
}

#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    config: Arc<AdapterConfig>,
}

impl EnvelopeBuilder {
    pub fn new(config: Arc<AdapterConfig>) -> Self {
        Self { config }
    }

    fn envelope(&self, operation: Operation, body: RequestBody) -> RequestEnvelope {
        RequestEnvelope {
            operation,
            pos: PointOfSale::from(self.config.as_ref()),
            body,
        }
    }

    pub fn departure_cities(&self) -> RequestEnvelope {
        self.envelope(Operation::DepartureCities, RequestBody::DepartureCities)
    }

    pub fn bus_avail(&self, query: &SearchQuery) -> RequestEnvelope {
        self.envelope(
            Operation::BusAvail,
            RequestBody::BusAvail {
                seats: query.seat_count,
                departure_date: query.date.clone(),
                origin_code: query.origin_id.clone(),
                destination_code: query.destination_id.clone(),
            },
        )
    }

    pub fn trip_details(&self, option_id: &str, date: &str) -> RequestEnvelope {
        self.envelope(
            Operation::TripDetails,
            RequestBody::TripDetails {
                option_id: option_id.to_string(),
                departure_date: date.to_string(),
            },
        )
    }

    pub fn bus_seats(&self, link_id: &str, date: &str) -> RequestEnvelope {
        self.envelope(
            Operation::BusSeats,
            RequestBody::BusSeats {
                link_id: link_id.to_string(),
                date: date.to_string(),
            },
        )
    }
}

// Wire structures
#[derive(Debug, Serialize)]
struct XmlRequest<'a> {
    #[serde(rename = "POS")]
    pos: XmlPos<'a>,
    #[serde(
        rename = "OriginDestinationInformation",
        skip_serializing_if = "Option::is_none"
    )]
    origin_destination: Option<XmlOriginDestination<'a>>,
    #[serde(rename = "Trip", skip_serializing_if = "Option::is_none")]
    trip: Option<XmlTrip<'a>>,
    #[serde(rename = "Segment", skip_serializing_if = "Option::is_none")]
    segment: Option<XmlSegment<'a>>,
}

#[derive(Debug, Serialize)]
struct XmlPos<'a> {
    #[serde(rename = "Source")]
    source: XmlSource<'a>,
}

#[derive(Debug, Serialize)]
struct XmlSource<'a> {
    #[serde(rename = "@AgentSine")]
    agent_sine: &'a str,
    #[serde(rename = "@City")]
    city: &'a str,
    #[serde(rename = "@ISOCountry")]
    iso_country: &'a str,
    #[serde(rename = "@ISOCurrency")]
    iso_currency: &'a str,
    #[serde(rename = "@Language")]
    language: &'a str,
    #[serde(rename = "RequestorID")]
    requestor: XmlRequestorId<'a>,
}

#[derive(Debug, Serialize)]
struct XmlRequestorId<'a> {
    #[serde(rename = "@ID")]
    id: &'a str,
    #[serde(rename = "@PASS")]
    pass: &'a str,
}

#[derive(Debug, Serialize)]
struct XmlOriginDestination<'a> {
    #[serde(rename = "@ShowAll")]
    show_all: bool,
    #[serde(rename = "@Seats")]
    seats: u32,
    #[serde(rename = "DepartureDateTime")]
    departure_date_time: &'a str,
    #[serde(rename = "OriginLocation")]
    origin: XmlLocation<'a>,
    #[serde(rename = "DestinationLocation")]
    destination: XmlLocation<'a>,
}

#[derive(Debug, Serialize)]
struct XmlLocation<'a> {
    #[serde(rename = "@LocationCode")]
    location_code: &'a str,
}

#[derive(Debug, Serialize)]
struct XmlTrip<'a> {
    #[serde(rename = "@OptionId")]
    option_id: &'a str,
    #[serde(rename = "@DepartureDateTime")]
    departure_date_time: &'a str,
}

#[derive(Debug, Serialize)]
struct XmlSegment<'a> {
    #[serde(rename = "@OptionId")]
    option_id: &'a str,
    #[serde(rename = "@Date")]
    date: &'a str,
}

impl<'a> From<&'a RequestEnvelope> for XmlRequest<'a> {
    fn from(envelope: &'a RequestEnvelope) -> Self {
        let pos = &envelope.pos;
        let mut request = XmlRequest {
            pos: XmlPos {
                source: XmlSource {
                    agent_sine: &pos.agent_sine,
                    city: &pos.city,
                    iso_country: &pos.iso_country,
                    iso_currency: &pos.iso_currency,
                    language: &pos.language,
                    requestor: XmlRequestorId {
                        id: &pos.requestor_id,
                        pass: &pos.requestor_pass,
                    },
                },
            },
            origin_destination: None,
            trip: None,
            segment: None,
        };

        match &envelope.body {
            RequestBody::DepartureCities => {}
            RequestBody::BusAvail {
                seats,
                departure_date,
                origin_code,
                destination_code,
            } => {
                request.origin_destination = Some(XmlOriginDestination {
                    show_all: true,
                    seats: *seats,
                    departure_date_time: departure_date,
                    origin: XmlLocation {
                        location_code: origin_code,
                    },
                    destination: XmlLocation {
                        location_code: destination_code,
                    },
                });
            }
            RequestBody::TripDetails {
                option_id,
                departure_date,
            } => {
                request.trip = Some(XmlTrip {
                    option_id,
                    departure_date_time: departure_date,
                });
            }
            RequestBody::BusSeats { link_id, date } => {
                request.segment = Some(XmlSegment {
                    option_id: link_id,
                    date,
                });
            }
        }

        request
    }
}
