use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use notification_services::NotificationError;
use search_area::{AreaError, Coordinate};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use snapshot_cache::CacheError;

/// Identifier of a UR property. Compared by exact equality, so the string
/// `"1"` and the number `1` are different listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListingId {
    /// Numeric identifier.
    Number(i64),
    /// String identifier.
    Text(String),
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingId::Number(id) => write!(f, "{}", id),
            ListingId::Text(id) => f.write_str(id),
        }
    }
}

impl From<&str> for ListingId {
    fn from(id: &str) -> Self {
        ListingId::Text(id.to_string())
    }
}

impl From<i64> for ListingId {
    fn from(id: i64) -> Self {
        ListingId::Number(id)
    }
}

/// A UR property with its current number of available rooms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    /// Property identifier
    pub id: ListingId,
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
    /// Number of rooms currently available
    #[serde(rename = "roomCount")]
    pub room_count: u32,
    /// Any other fields returned by UR, kept as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Listing {
    /// Creates a listing without extra fields.
    pub fn new(id: impl Into<ListingId>, lat: f64, lng: f64, room_count: u32) -> Self {
        Self {
            id: id.into(),
            lat,
            lng,
            room_count,
            extra: serde_json::Map::new(),
        }
    }

    /// Location of the property.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// A listing record as it arrives over the wire, before validation.
#[derive(Debug, Deserialize)]
pub(crate) struct RawListing {
    id: ListingId,
    #[serde(deserialize_with = "deserialize_degrees")]
    lat: f64,
    #[serde(deserialize_with = "deserialize_degrees")]
    lng: f64,
    #[serde(
        rename = "roomCount",
        default,
        deserialize_with = "deserialize_room_count"
    )]
    room_count: Option<u32>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl TryFrom<RawListing> for Listing {
    type Error = ScanError;

    fn try_from(raw: RawListing) -> Result<Self, Self::Error> {
        let room_count = raw
            .room_count
            .ok_or_else(|| ScanError::MissingRoomCount { id: raw.id.clone() })?;

        Ok(Listing {
            id: raw.id,
            lat: raw.lat,
            lng: raw.lng,
            room_count,
            extra: raw.extra,
        })
    }
}

/// UR sends some numbers as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Integer(u64),
    Float(f64),
    Text(String),
}

fn deserialize_degrees<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Integer(value) => Ok(value as f64),
        NumberOrString::Float(value) => Ok(value),
        NumberOrString::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("invalid coordinate: {:?}", text))),
    }
}

fn deserialize_room_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match Option::<NumberOrString>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(NumberOrString::Integer(value)) => value,
        Some(NumberOrString::Float(value)) if value >= 0.0 && value.fract() == 0.0 => value as u64,
        Some(NumberOrString::Float(value)) => {
            return Err(de::Error::custom(format!("invalid room count: {}", value)));
        }
        Some(NumberOrString::Text(text)) => text
            .trim()
            .parse::<u64>()
            .map_err(|_| de::Error::custom(format!("invalid room count: {:?}", text)))?,
    };

    u32::try_from(count)
        .map(Some)
        .map_err(|_| de::Error::custom(format!("room count out of range: {}", count)))
}

/// All listings of one poll, keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    listings: BTreeMap<ListingId, Listing>,
}

impl Snapshot {
    /// Builds a snapshot, rejecting duplicate identifiers.
    pub fn from_listings(listings: impl IntoIterator<Item = Listing>) -> Result<Self, ScanError> {
        let mut by_id = BTreeMap::new();

        for listing in listings {
            if by_id.contains_key(&listing.id) {
                return Err(ScanError::DuplicateListing { id: listing.id });
            }
            by_id.insert(listing.id.clone(), listing);
        }

        Ok(Self { listings: by_id })
    }

    pub(crate) fn from_raw(records: Vec<RawListing>) -> Result<Self, ScanError> {
        let listings = records
            .into_iter()
            .map(Listing::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_listings(listings)
    }

    /// Serializes the snapshot as a JSON array ordered by identifier.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, ScanError> {
        let listings: Vec<&Listing> = self.listings.values().collect();
        serde_json::to_vec(&listings).map_err(|e| ScanError::DataFormat(e.to_string()))
    }

    /// Looks a listing up by identifier.
    pub fn get(&self, id: &ListingId) -> Option<&Listing> {
        self.listings.get(id)
    }

    /// Listings ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &Listing> {
        self.listings.values()
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the snapshot has no listings.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

/// A record of the cached snapshot. Only the identifier is required.
#[derive(Debug, Deserialize)]
struct CachedRecord {
    id: ListingId,
    #[serde(
        rename = "roomCount",
        default,
        deserialize_with = "deserialize_room_count"
    )]
    room_count: Option<u32>,
}

/// Room counts recorded by the previous run, keyed by identifier.
///
/// A cached record without `roomCount` is kept as is; it only becomes an
/// error when a current listing inside the area is looked up against it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviousSnapshot {
    room_counts: BTreeMap<ListingId, Option<u32>>,
}

impl PreviousSnapshot {
    /// An empty previous snapshot, used when nothing was cached yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes bytes written by [`Snapshot::to_json_vec`].
    ///
    /// Anything that is not a JSON array of records with unique ids yields
    /// `DataFormat`.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, ScanError> {
        let records: Vec<CachedRecord> = serde_json::from_slice(data)
            .map_err(|e| ScanError::DataFormat(format!("Invalid snapshot JSON: {}", e)))?;

        let mut room_counts = BTreeMap::new();
        for record in records {
            if room_counts.contains_key(&record.id) {
                return Err(ScanError::DataFormat(format!(
                    "Listing {} appears more than once in the cached snapshot",
                    record.id
                )));
            }
            room_counts.insert(record.id, record.room_count);
        }

        Ok(Self { room_counts })
    }

    /// Rooms the listing had last time, 0 if it was not cached.
    pub fn room_count(&self, id: &ListingId) -> Result<u32, ScanError> {
        match self.room_counts.get(id) {
            None => Ok(0),
            Some(Some(count)) => Ok(*count),
            Some(None) => Err(ScanError::MissingRoomCount { id: id.clone() }),
        }
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.room_counts.len()
    }

    /// Whether nothing was cached.
    pub fn is_empty(&self) -> bool {
        self.room_counts.is_empty()
    }
}

impl From<&Snapshot> for PreviousSnapshot {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            room_counts: snapshot
                .iter()
                .map(|listing| (listing.id.clone(), Some(listing.room_count)))
                .collect(),
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Nothing new inside the area; no email was sent and the cache is untouched.
    NoNewRooms {
        /// Current listings inside the search area.
        listings_in_area: usize,
    },
    /// An email was sent and the cache now holds the current snapshot.
    Notified {
        /// Rooms that became available since the cached snapshot.
        new_rooms: u64,
        /// Message id returned by the email transport.
        message_id: String,
        /// When the current listings were fetched.
        checked_at: DateTime<Utc>,
    },
}

/// Custom error type for scan operations
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The boundary of the search area is invalid
    #[error("Search area error: {0}")]
    Area(#[from] AreaError),

    /// HTTP request to UR failed
    #[error("API error: {0}")]
    ApiError(String),

    /// UR answered with a status other than 200
    #[error("UR returned HTTP {0}")]
    UnexpectedStatus(u16),

    /// UR answered with something other than a JSON array
    #[error("UR returned a non-array response")]
    NotAnArray,

    /// UR answered with an empty array, which points at a broken query
    #[error("UR returned an empty array, check the query parameters")]
    EmptyResponse,

    /// Data format error
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// A listing arrived without its room count
    #[error("Listing {id} has no roomCount")]
    MissingRoomCount {
        /// Identifier of the incomplete listing
        id: ListingId,
    },

    /// The same identifier appeared twice in one snapshot
    #[error("Listing {id} appears more than once")]
    DuplicateListing {
        /// The repeated identifier
        id: ListingId,
    },

    /// Snapshot cache error
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Email delivery error
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
