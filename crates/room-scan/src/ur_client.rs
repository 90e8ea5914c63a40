use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::scan_types::{RawListing, ScanError, Snapshot};

/// Map marker endpoint of the UR rental search.
pub const UR_MAP_MARKER_URL: &str =
    "https://chintai.sumai.ur-net.go.jp/chintai/api/bukken/search/map_marker/";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.4854.0 Safari/537.36";

/// Source of the current listings.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetches every listing matching the configured query.
    async fn fetch_listings(&self) -> Result<Snapshot, ScanError>;
}

/// Filters sent with the map marker request.
///
/// The bounding box is wider than the search area; the polygon test does the
/// precise filtering afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Minimum rent in yen
    pub rent_low: Option<u32>,
    /// Maximum rent in yen
    pub rent_high: Option<u32>,
    /// Minimum floor space in square meters
    pub floorspace_low: Option<u32>,
    /// Maximum floor space in square meters
    pub floorspace_high: Option<u32>,
    /// North-east corner latitude
    pub ne_lat: f64,
    /// North-east corner longitude
    pub ne_lng: f64,
    /// South-west corner latitude
    pub sw_lat: f64,
    /// South-west corner longitude
    pub sw_lng: f64,
    /// Request the compact marker set
    pub small: bool,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            rent_low: None,
            rent_high: None,
            floorspace_low: Some(60),
            floorspace_high: None,
            ne_lat: 35.79313801503034,
            ne_lng: 139.96174996739074,
            sw_lat: 35.62699028495847,
            sw_lng: 139.61980050450012,
            small: false,
        }
    }
}

impl SearchQuery {
    /// Encodes the query as an `application/x-www-form-urlencoded` body.
    pub fn to_form_body(&self) -> String {
        let optional = |value: Option<u32>| value.map(|v| v.to_string()).unwrap_or_default();

        let params = [
            ("rent_low", optional(self.rent_low)),
            ("rent_high", optional(self.rent_high)),
            ("floorspace_low", optional(self.floorspace_low)),
            ("floorspace_high", optional(self.floorspace_high)),
            ("ne_lat", self.ne_lat.to_string()),
            ("ne_lng", self.ne_lng.to_string()),
            ("sw_lat", self.sw_lat.to_string()),
            ("sw_lng", self.sw_lng.to_string()),
            ("small", self.small.to_string()),
        ];

        params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Client for the UR map marker API
pub struct UrClient {
    client: Client,
    url: String,
    query: SearchQuery,
}

impl UrClient {
    /// Creates a client for the production endpoint with the default query.
    pub fn new() -> Result<Self, ScanError> {
        Self::with_url(UR_MAP_MARKER_URL, SearchQuery::default())
    }

    /// Creates a client for a specific endpoint and query.
    pub fn with_url(url: impl Into<String>, query: SearchQuery) -> Result<Self, ScanError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ScanError::ApiError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            query,
        })
    }
}

#[async_trait]
impl ListingSource for UrClient {
    async fn fetch_listings(&self) -> Result<Snapshot, ScanError> {
        debug!("Fetching listings from {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .header("Origin", "https://www.ur-net.go.jp")
            .header("Referer", "https://www.ur-net.go.jp/")
            .header(
                "Content-Type",
                "application/x-www-form-urlencoded; charset=UTF-8",
            )
            .header("Accept", "application/json, text/javascript, */*; q=0.01")
            .body(self.query.to_form_body())
            .send()
            .await
            .map_err(|e| ScanError::ApiError(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        debug!("API response status: {}", status);

        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            warn!("UR request failed with status {}: {}", status, body);
            return Err(ScanError::UnexpectedStatus(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ScanError::DataFormat(format!("Failed to parse response: {}", e)))?;

        let snapshot = parse_listings(body)?;
        info!("Fetched {} listings from UR", snapshot.len());

        Ok(snapshot)
    }
}

/// Validates a map marker response and converts it into a snapshot.
fn parse_listings(body: Value) -> Result<Snapshot, ScanError> {
    let Value::Array(records) = body else {
        return Err(ScanError::NotAnArray);
    };

    if records.is_empty() {
        return Err(ScanError::EmptyResponse);
    }

    let raw = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value::<RawListing>(record).map_err(|e| {
                ScanError::DataFormat(format!("Invalid listing at index {}: {}", index, e))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Snapshot::from_raw(raw)
}
