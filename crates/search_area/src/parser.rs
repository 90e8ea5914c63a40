use std::sync::LazyLock;

use regex::Regex;

use crate::{AreaError, Coordinate};

static NON_COORDINATE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9\n,.]").expect("static regex is valid"));

/// Parses a block of "lat,lng" lines into coordinates, in source order.
///
/// Every character other than digits, newlines, commas and dots is removed
/// first, so labels, comments and indentation are ignored. Lines that end up
/// empty are skipped; any other line must hold exactly two numbers.
pub fn parse_coordinates(text: &str) -> Result<Vec<Coordinate>, AreaError> {
    let stripped = NON_COORDINATE_CHARS.replace_all(text, "");

    let mut coordinates = Vec::new();

    for (index, line) in stripped.trim().split('\n').enumerate() {
        if line.is_empty() {
            continue;
        }

        let malformed = || AreaError::MalformedLine {
            line: index + 1,
            content: line.to_string(),
        };

        let mut fields = line.split(',');
        let (Some(lat), Some(lng), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(malformed());
        };

        let lat = lat.parse::<f64>().map_err(|_| malformed())?;
        let lng = lng.parse::<f64>().map_err(|_| malformed())?;

        coordinates.push(Coordinate::new(lat, lng));
    }

    log::debug!("Parsed {} boundary coordinates", coordinates.len());

    Ok(coordinates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_source_order() {
        let text = "
            35.6153070338361,139.80924926220052
            35.62005163712189,139.70762572704427
            35.733168047672926,139.68061011061275
        ";

        let coordinates = parse_coordinates(text).unwrap();

        assert_eq!(
            coordinates,
            vec![
                Coordinate::new(35.6153070338361, 139.80924926220052),
                Coordinate::new(35.62005163712189, 139.70762572704427),
                Coordinate::new(35.733168047672926, 139.68061011061275),
            ]
        );
    }

    #[test]
    fn test_parse_ignores_labels_and_blank_lines() {
        let text = "# north-east corner\n\
                    lat 1.5, lng 2.5 (approx)\n\
                    \n\
                    3,4\n\
                    // comment only\n\
                    5.25,6";

        let coordinates = parse_coordinates(text).unwrap();

        assert_eq!(coordinates.len(), 3);
        assert_eq!(coordinates[0], Coordinate::new(1.5, 2.5));
        assert_eq!(coordinates[1], Coordinate::new(3.0, 4.0));
        assert_eq!(coordinates[2], Coordinate::new(5.25, 6.0));
    }

    #[test]
    fn test_parse_handles_crlf() {
        let coordinates = parse_coordinates("1,2\r\n3,4\r\n").unwrap();
        assert_eq!(
            coordinates,
            vec![Coordinate::new(1.0, 2.0), Coordinate::new(3.0, 4.0)]
        );
    }

    #[test]
    fn test_parse_rejects_single_field() {
        let err = parse_coordinates("1,2\n35.6\n5,6").unwrap_err();
        assert_eq!(
            err,
            AreaError::MalformedLine {
                line: 2,
                content: "35.6".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_three_fields() {
        let err = parse_coordinates("1,2,3").unwrap_err();
        assert!(matches!(err, AreaError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_non_numeric_field() {
        let err = parse_coordinates("1..2,3").unwrap_err();
        assert!(matches!(err, AreaError::MalformedLine { line: 1, .. }));

        let err = parse_coordinates("1,").unwrap_err();
        assert!(matches!(err, AreaError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_coordinates("   \n  ").unwrap().is_empty());
    }
}
