use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{LineString, Polygon};

use crate::{AreaError, Coordinate, parse_coordinates};

/// Where a point lies relative to a search area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Strictly inside the boundary.
    Inside,
    /// Exactly on an edge or vertex.
    OnBoundary,
    /// Strictly outside the boundary.
    Outside,
}

/// An immutable polygon describing the area of interest.
///
/// The ring is closed implicitly: the last vertex connects back to the first.
/// Classification is delegated to `geo`, which uses a winding-number test on
/// top of robust orientation predicates, so points sitting on an edge do not
/// flip between inside and outside because of rounding.
#[derive(Debug, Clone)]
pub struct SearchArea {
    polygon: Polygon<f64>,
    vertices: Vec<Coordinate>,
}

impl SearchArea {
    /// Builds an area from its boundary vertices.
    pub fn new(vertices: Vec<Coordinate>) -> Result<Self, AreaError> {
        if vertices.len() < 3 {
            return Err(AreaError::TooFewPoints(vertices.len()));
        }

        let ring: LineString<f64> = vertices.iter().copied().map(geo::Coord::from).collect();
        // Polygon::new closes the ring if the first and last vertices differ
        let polygon = Polygon::new(ring, Vec::new());

        Ok(Self { polygon, vertices })
    }

    /// Parses a "lat,lng" boundary block and builds the area from it.
    pub fn parse(text: &str) -> Result<Self, AreaError> {
        Self::new(parse_coordinates(text)?)
    }

    /// Boundary vertices in the order they were given.
    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// Classifies a point as inside, on the boundary of, or outside the area.
    pub fn classify(&self, point: Coordinate) -> Position {
        match self.polygon.coordinate_position(&point.into()) {
            CoordPos::Inside => Position::Inside,
            CoordPos::OnBoundary => Position::OnBoundary,
            CoordPos::Outside => Position::Outside,
        }
    }

    /// Returns true when the point is inside the area or on its boundary.
    pub fn contains(&self, point: Coordinate) -> bool {
        matches!(
            self.classify(point),
            Position::Inside | Position::OnBoundary
        )
    }
}
