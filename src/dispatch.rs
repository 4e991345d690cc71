// Named operations for the front-end. Requests are JSON objects tagged by
// `operation` with camelCase parameters; every outcome carries a status code.

use crate::error::{AdapterError, FailureKind};
use crate::models::{City, SearchQuery, SeatMap, SeatingResolution, TripDetails, TripOption};
use crate::service::TicketingService;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum OperationRequest {
    ListCities,
    #[serde(rename_all = "camelCase")]
    SearchTrips {
        #[serde(default, deserialize_with = "lenient_string")]
        departure_city_id: Option<String>,
        #[serde(default, deserialize_with = "lenient_string")]
        destination_city_id: Option<String>,
        #[serde(default, deserialize_with = "lenient_string")]
        date: Option<String>,
        #[serde(default)]
        passengers: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    GetTripDetails {
        #[serde(default, deserialize_with = "lenient_string")]
        option_id: Option<String>,
        #[serde(default, deserialize_with = "lenient_string")]
        date: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    GetSeatMap {
        #[serde(default, deserialize_with = "lenient_string")]
        link_id: Option<String>,
        #[serde(default, deserialize_with = "lenient_string")]
        date: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ResolveSeating {
        #[serde(default, deserialize_with = "lenient_string")]
        option_id: Option<String>,
        #[serde(default, deserialize_with = "lenient_string")]
        date: Option<String>,
    },
}

impl OperationRequest {
    pub fn name(&self) -> &'static str {
        match self {
            OperationRequest::ListCities => "listCities",
            OperationRequest::SearchTrips { .. } => "searchTrips",
            OperationRequest::GetTripDetails { .. } => "getTripDetails",
            OperationRequest::GetSeatMap { .. } => "getSeatMap",
            OperationRequest::ResolveSeating { .. } => "resolveSeating",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Cities { cities: Vec<City> },
    Trips { count: usize, options: Vec<TripOption> },
    TripDetails(TripDetails),
    SeatMap(SeatMap),
    Seating(SeatingResolution),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    pub success: bool,
    #[serde(skip)]
    pub status: u16,
    #[serde(flatten)]
    pub payload: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_id: Option<String>,
}

impl OperationResponse {
    fn ok(payload: Payload) -> Self {
        Self {
            success: true,
            status: 200,
            payload: Some(payload),
            error: None,
            kind: None,
            link_id: None,
        }
    }

    fn failed(error: &AdapterError) -> Self {
        Self {
            success: false,
            status: error.status_code(),
            payload: None,
            error: Some(error.to_string()),
            kind: Some(error.kind()),
            link_id: None,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({ "success": false, "error": e.to_string() })
        })
    }
}

pub struct Dispatcher {
    service: TicketingService,
}

impl Dispatcher {
    pub fn new(service: TicketingService) -> Self {
        Self { service }
    }

    pub async fn dispatch_json(&self, body: &str) -> OperationResponse {
        match serde_json::from_str::<OperationRequest>(body) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => {
                warn!(error = %e, "rejected malformed operation request");
                OperationResponse::failed(&AdapterError::InvalidRequest(e.to_string()))
            }
        }
    }

    pub async fn dispatch(&self, request: OperationRequest) -> OperationResponse {
        let name = request.name();
        info!(operation = name, "dispatching");

        let response = match request {
            OperationRequest::ListCities => match self.service.list_cities().await {
                Ok(cities) => OperationResponse::ok(Payload::Cities { cities }),
                Err(e) => OperationResponse::failed(&e),
            },
            OperationRequest::SearchTrips {
                departure_city_id,
                destination_city_id,
                date,
                passengers,
            } => {
                match required(&[
                    ("departureCityId", departure_city_id),
                    ("destinationCityId", destination_city_id),
                    ("date", date),
                ]) {
                    Ok(values) => {
                        let [origin, destination, date] = values;
                        let query = SearchQuery::new(origin, destination, date)
                            .with_seats(passengers.filter(|p| *p > 0).unwrap_or(1));
                        match self.service.search_trips(&query).await {
                            Ok(options) => OperationResponse::ok(Payload::Trips {
                                count: options.len(),
                                options,
                            }),
                            Err(e) => OperationResponse::failed(&e),
                        }
                    }
                    Err(e) => OperationResponse::failed(&e),
                }
            }
            OperationRequest::GetTripDetails { option_id, date } => {
                match required(&[("optionId", option_id), ("date", date)]) {
                    Ok([option_id, date]) => {
                        match self.service.trip_details(&option_id, &date).await {
                            Ok(details) => OperationResponse::ok(Payload::TripDetails(details)),
                            Err(e) => OperationResponse::failed(&e),
                        }
                    }
                    Err(e) => OperationResponse::failed(&e),
                }
            }
            OperationRequest::GetSeatMap { link_id, date } => {
                match required(&[("linkId", link_id), ("date", date)]) {
                    Ok([link_id, date]) => match self.service.seat_map(&link_id, &date).await {
                        Ok(map) => OperationResponse::ok(Payload::SeatMap(map)),
                        Err(e) => OperationResponse::failed(&e),
                    },
                    Err(e) => OperationResponse::failed(&e),
                }
            }
            OperationRequest::ResolveSeating { option_id, date } => {
                match required(&[("optionId", option_id), ("date", date)]) {
                    Ok([option_id, date]) => {
                        match self.service.resolve_seating(&option_id, &date).await {
                            Ok(resolution) => OperationResponse::ok(Payload::Seating(resolution)),
                            Err(failure) => OperationResponse {
                                link_id: failure.link_id.clone(),
                                ..OperationResponse::failed(&failure.error)
                            },
                        }
                    }
                    Err(e) => OperationResponse::failed(&e),
                }
            }
        };

        if !response.success {
            warn!(
                operation = name,
                status = response.status,
                error = response.error.as_deref().unwrap_or_default(),
                "operation failed"
            );
        }
        response
    }
}

// All named parameters must be present and non-blank
fn required<const N: usize>(
    params: &[(&str, Option<String>); N],
) -> Result<[String; N], AdapterError> {
    let missing: Vec<&str> = params
        .iter()
        .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    if !missing.is_empty() {
        return Err(AdapterError::InvalidRequest(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    Ok(params
        .clone()
        .map(|(_, value)| value.unwrap_or_default().trim().to_string()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdapterConfig;
    use crate::envelope::Operation;
    use crate::transport::mock_transport::MockTransport;
    use serde_json::json;
    use std::sync::Arc;
    use test_case::test_case;

    fn dispatcher(transport: Arc<MockTransport>) -> Dispatcher {
        Dispatcher::new(TicketingService::new(AdapterConfig::default(), transport))
    }

    #[test]
    fn test_parses_named_operations() {
        let request: OperationRequest = serde_json::from_value(json!({
            "operation": "searchTrips",
            "departureCityId": 101,
            "destinationCityId": "202",
            "date": "2024-05-01",
            "passengers": 2
        }))
        .unwrap();

        assert_eq!(
            request,
            OperationRequest::SearchTrips {
                departure_city_id: Some("101".to_string()),
                destination_city_id: Some("202".to_string()),
                date: Some("2024-05-01".to_string()),
                passengers: Some(2),
            }
        );
        assert_eq!(request.name(), "searchTrips");
    }

    #[test_case(r#"{"operation":"searchTrips","departureCityId":"1","date":"2024-05-01"}"#, "destinationCityId"; "search without destination")]
    #[test_case(r#"{"operation":"getTripDetails","optionId":"  ","date":"2024-05-01"}"#, "optionId"; "blank option id")]
    #[test_case(r#"{"operation":"getSeatMap","date":"2024-05-01"}"#, "linkId"; "seat map without link id")]
    #[test_case(r#"{"operation":"resolveSeating","optionId":"OPT-1"}"#, "date"; "seating without date")]
    fn test_missing_parameters_never_reach_backend(body: &str, field: &str) {
        let transport = Arc::new(MockTransport::new());
        let response = tokio_test::block_on(dispatcher(transport.clone()).dispatch_json(body));

        assert!(!response.success);
        assert_eq!(response.status, 400);
        assert_eq!(response.kind, Some(FailureKind::InvalidRequest));
        assert!(response.error.as_deref().unwrap_or_default().contains(field));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_operation_is_bad_request() {
        let transport = Arc::new(MockTransport::new());
        let response = dispatcher(transport)
            .dispatch_json(r#"{"operation":"bookSeat"}"#)
            .await;
        assert_eq!(response.status, 400);
    }

    #[tokio::test]
    async fn test_search_response_shape() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            Operation::BusAvail,
            include_str!("../samples/bus_avail_response.xml"),
        );

        let response = dispatcher(transport.clone())
            .dispatch_json(r#"{"operation":"searchTrips","departureCityId":101,"destinationCityId":202,"date":"2024-05-01"}"#)
            .await;

        assert_eq!(response.status, 200);
        let json = response.to_json();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 2);
        assert_eq!(json["options"][0]["optionId"], "OPT-1");
        assert_eq!(json["options"][0]["departureTime"], "07:30");
        assert!(json.get("error").is_none());

        // passengers defaults to one seat
        match transport.sent()[0].body() {
            crate::envelope::RequestBody::BusAvail { seats, .. } => assert_eq!(*seats, 1),
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_routes_is_successful_empty_search() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            Operation::BusAvail,
            r#"<REZMax_getBusAvailRS><Warnings><Warning ShortText="Nu exista curse"/></Warnings></REZMax_getBusAvailRS>"#,
        );

        let json = dispatcher(transport)
            .dispatch_json(r#"{"operation":"searchTrips","departureCityId":"1","destinationCityId":"2","date":"2024-05-01"}"#)
            .await
            .to_json();

        assert_eq!(json, json!({ "success": true, "count": 0, "options": [] }));
    }

    #[tokio::test]
    async fn test_cities_and_seat_map_shapes() {
        let transport = Arc::new(MockTransport::new());
        transport
            .respond(
                Operation::DepartureCities,
                include_str!("../samples/departure_cities_response.xml"),
            )
            .respond(
                Operation::BusSeats,
                include_str!("../samples/bus_seats_response.xml"),
            );
        let dispatcher = dispatcher(transport);

        let cities = dispatcher.dispatch(OperationRequest::ListCities).await.to_json();
        assert_eq!(
            cities["cities"][0],
            json!({ "id": "101", "name": "Brasov", "region": "Brasov" })
        );

        let seats = dispatcher
            .dispatch(OperationRequest::GetSeatMap {
                link_id: Some("LNK-77123".to_string()),
                date: Some("2024-05-01".to_string()),
            })
            .await
            .to_json();
        assert_eq!(seats["totalSeats"], 7);
        assert_eq!(seats["availableNumbers"], json!(["2", "3", "13"]));
        assert_eq!(seats["seats"][6], json!({ "number": "13", "occupied": false, "row": 3 }));
    }

    #[tokio::test]
    async fn test_trip_details_failure_status() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            Operation::TripDetails,
            "<REZMax_getTripDetailsRS><Success/></REZMax_getTripDetailsRS>",
        );

        let response = dispatcher(transport)
            .dispatch(OperationRequest::GetTripDetails {
                option_id: Some("OPT-1".to_string()),
                date: Some("2024-05-01".to_string()),
            })
            .await;

        assert_eq!(response.status, 422);
        assert_eq!(response.kind, Some(FailureKind::DomainValidationFailure));
    }

    #[tokio::test]
    async fn test_seating_failure_reports_link_id() {
        let transport = Arc::new(MockTransport::new());
        transport
            .respond(
                Operation::TripDetails,
                include_str!("../samples/trip_details_response.xml"),
            )
            .respond(
                Operation::BusSeats,
                "<REZMax_GetBusSeatsRS><Success/></REZMax_GetBusSeatsRS>",
            );

        let response = dispatcher(transport)
            .dispatch_json(r#"{"operation":"resolveSeating","optionId":"OPT-1","date":"2024-05-01"}"#)
            .await;

        assert_eq!(response.status, 404);
        let json = response.to_json();
        assert_eq!(json["success"], false);
        assert_eq!(json["linkId"], "LNK-77123");
        assert_eq!(json["kind"], "SEAT_MAP_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_auto_allocation_shape() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            Operation::TripDetails,
            r#"<REZMax_getTripDetailsRS><Segments><Segment LinkId="LNK-2"/></Segments></REZMax_getTripDetailsRS>"#,
        );

        let json = dispatcher(transport)
            .dispatch(OperationRequest::ResolveSeating {
                option_id: Some("OPT-2".to_string()),
                date: Some("2024-05-01".to_string()),
            })
            .await
            .to_json();

        assert_eq!(
            json,
            json!({
                "success": true,
                "linkId": "LNK-2",
                "departureDate": "2024-05-01",
                "autoAllocation": true
            })
        );
    }
}
