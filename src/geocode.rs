//! Reverse geocoding: coordinates in, address breakdown out.
//!
//! The default implementation talks to the public Nominatim service. The
//! adapter is a trait so a different service (or a test mock) can slot in
//! behind the same contract.

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use crate::location::{Address, Coordinates};

/// Public Nominatim instance. No API key, but requests must identify the
/// client via User-Agent per the service's usage policy.
pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org";

/// The upstream offers no latency guarantee; a slow lookup degrades to
/// empty address fields instead of stalling the pipeline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Detail level of the lookup. 18 resolves down to building/suburb scale.
const ZOOM: &str = "18";

/// Maps a coordinate pair to an address breakdown.
///
/// Infallible by contract: implementations absorb transport and parse
/// failures and return an all-empty [`Address`], which callers treat as
/// "enrichment unavailable" rather than a hard failure.
#[async_trait::async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Address;
}

/// Reverse-geocoding client for the OpenStreetMap Nominatim API.
pub struct NominatimClient {
    endpoint: String,
    client: Client,
}

impl NominatimClient {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Point the client at a different Nominatim-compatible endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self { endpoint: endpoint.into(), client }
    }

    async fn lookup(&self, coordinates: Coordinates) -> Result<Address> {
        let url = format!("{}/reverse", self.endpoint);
        let lat = coordinates.latitude.to_string();
        let lon = coordinates.longitude.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "json"),
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("zoom", ZOOM),
                ("addressdetails", "1"),
            ])
            .send()
            .await
            .context("reverse geocoding request failed")?
            .error_for_status()
            .context("reverse geocoding request rejected")?;

        let body: serde_json::Value = response
            .json()
            .await
            .context("failed to parse reverse geocoding response")?;

        Ok(map_address(&body))
    }
}

impl Default for NominatimClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ReverseGeocoder for NominatimClient {
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Address {
        match self.lookup(coordinates).await {
            Ok(address) => address,
            Err(e) => {
                log::warn!(
                    "Reverse geocoding failed for ({}, {}): {e:#}",
                    coordinates.latitude,
                    coordinates.longitude
                );
                Address::default()
            }
        }
    }
}

/// Map the heterogeneous upstream field names onto the four canonical
/// address fields, each resolved from a fixed preference order.
fn map_address(body: &serde_json::Value) -> Address {
    let address = &body["address"];
    Address {
        postal_code: field(address, &["postcode"]),
        province: field(address, &["state", "province"]),
        district: field(address, &["county", "city"]),
        sub_district: field(address, &["suburb", "neighbourhood", "village"]),
    }
}

/// First key that holds a non-empty string.
fn field(address: &serde_json::Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        address[*key]
            .as_str()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(String::from)
    })
}
