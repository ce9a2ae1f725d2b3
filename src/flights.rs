use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlightError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),
    #[error("upstream error payload: {0}")]
    Api(String),
    #[error("AVIATIONSTACK_API_KEY is not set")]
    MissingApiKey,
}

// Aviationstack /v1/flights response, reduced to the fields we read.
#[derive(Debug, Clone, Deserialize)]
pub struct FlightRecord {
    pub flight_date: Option<String>,
    pub departure: Option<FlightEndpoint>,
    pub arrival: Option<FlightEndpoint>,
    pub airline: Option<FlightAirline>,
    pub flight: Option<FlightNumber>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightEndpoint {
    pub airport: Option<String>,
    pub iata: Option<String>,
    pub scheduled: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlightAirline {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlightNumber {
    pub iata: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SimplifiedFlight {
    pub flight_date: Option<String>,
    pub airline: Option<String>,
    pub flight_number: Option<String>,
    pub departure_airport: Option<String>,
    pub departure_iata: Option<String>,
    pub departure_time: Option<String>,
    pub arrival_airport: Option<String>,
    pub arrival_iata: Option<String>,
    pub arrival_time: Option<String>,
}

pub struct AviationstackClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl AviationstackClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .user_agent("FlugbasarServer/1.0")
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            api_key,
        }
    }

    pub async fn fetch(
        &self,
        dep_iata: &str,
        arr_iata: &str,
    ) -> Result<Vec<FlightRecord>, FlightError> {
        let api_key = self.api_key.as_deref().ok_or(FlightError::MissingApiKey)?;
        let url = format!("{}/flights", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("access_key", api_key),
                ("dep_iata", dep_iata),
                ("arr_iata", arr_iata),
                ("limit", "10"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FlightError::Status(status));
        }

        let body: Value = response.json().await?;
        parse_flights_body(body)
    }
}

/// Aviationstack sometimes reports failures as an `error` object in a
/// 200 body, so the status check alone is not enough.
pub fn parse_flights_body(body: Value) -> Result<Vec<FlightRecord>, FlightError> {
    if let Some(error) = body.get("error") {
        if !error.is_null() {
            return Err(FlightError::Api(error.to_string()));
        }
    }

    let data = body.get("data").cloned().unwrap_or(Value::Array(Vec::new()));
    let records: Vec<FlightRecord> =
        serde_json::from_value(data).map_err(|e| FlightError::Api(e.to_string()))?;
    Ok(records)
}

/// Flattens upstream records to the fields the frontend renders. The
/// list is reversed as a "newest first" heuristic; the upstream order
/// is not guaranteed, so this is a documented quirk, not a contract.
pub fn simplify_flights(records: Vec<FlightRecord>) -> Vec<SimplifiedFlight> {
    let mut simplified: Vec<SimplifiedFlight> = records
        .into_iter()
        .map(|record| {
            let departure = record.departure.unwrap_or_default();
            let arrival = record.arrival.unwrap_or_default();

            SimplifiedFlight {
                flight_date: record.flight_date,
                airline: record.airline.and_then(|a| a.name),
                flight_number: record.flight.and_then(|f| f.iata),
                departure_airport: departure.airport,
                departure_iata: departure.iata,
                departure_time: departure.scheduled.as_deref().and_then(format_local_hm),
                arrival_airport: arrival.airport,
                arrival_iata: arrival.iata,
                arrival_time: arrival.scheduled.as_deref().and_then(format_local_hm),
            }
        })
        .collect();

    simplified.reverse();
    simplified
}

/// `HH:MM` in the timestamp's own UTC offset; a trailing `Z` counts as
/// UTC. Unparseable input yields `None` rather than a bogus time.
fn format_local_hm(value: &str) -> Option<String> {
    chrono::DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.format("%H:%M").to_string())
}
