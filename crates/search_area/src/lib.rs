//! # Search Area
//!
//! This crate describes the geographic area the monitor cares about.
//! It parses free-form "lat,lng" boundary text into a polygon and answers
//! whether a listing's coordinates fall inside it.

/// Coordinate and error types shared by the parser and the polygon.
mod types;
pub use types::*;

/// Parsing of "lat,lng" text blocks into ordered coordinates.
mod parser;
pub use parser::*;

/// Polygon membership test built on robust geometric predicates.
mod polygon;
pub use polygon::*;

/// The built-in area of interest.
mod boundary;
pub use boundary::*;
