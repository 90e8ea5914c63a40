/// A geographic point in degrees. Range is not validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Coordinate {
    /// Creates a coordinate from a latitude/longitude pair.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    // x is longitude, y is latitude
    fn from(coordinate: Coordinate) -> Self {
        geo::Coord {
            x: coordinate.lng,
            y: coordinate.lat,
        }
    }
}

/// Errors raised while building a search area.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AreaError {
    /// A boundary line did not contain exactly two numeric fields.
    #[error("Malformed coordinate on line {line}: {content:?}")]
    MalformedLine {
        /// 1-based line number in the stripped text.
        line: usize,
        /// The offending line after stripping.
        content: String,
    },

    /// The boundary has too few points to enclose an area.
    #[error("A search area needs at least 3 points, got {0}")]
    TooFewPoints(usize),
}
