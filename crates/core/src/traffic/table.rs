//! Semicolon-delimited traffic sensor table
//!
//! One row per sensor. The layout produced by the averaging step of the
//! collector looks like:
//!
//! ```text
//! Ulica;Współrzędne;00:00;01:00;...;23:00
//! Dąbrowskiego;52.4125,16.8952;4;3;...;12
//! ```
//!
//! The coordinate column and the 24 `HH:00` columns are required. The street
//! column is optional and other columns are ignored. Coordinates are `"lat,lon"`, so the combined field
//! contains a comma and the table cannot use commas as its delimiter.

use super::point::TrafficPoint;
use crate::core_types::{geo, GeoPoint};
use crate::error::InputError;
use crate::simulation::profiles::HOURS_PER_DAY;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use tracing::debug;

/// How to read a traffic table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficTableFormat {
    pub delimiter: char,
    /// Header of the combined `lat,lon` column
    pub coordinate_column: String,
    /// Header of the street name column
    pub street_column: String,
}

impl Default for TrafficTableFormat {
    fn default() -> Self {
        Self {
            delimiter: ';',
            coordinate_column: "Współrzędne".to_string(),
            street_column: "Ulica".to_string(),
        }
    }
}

fn split_fields(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter)
        .map(|f| f.trim().trim_matches('"').trim())
        .collect()
}

/// Parse `"lat,lon"` into a point
pub(crate) fn parse_lat_lon(value: &str) -> Option<GeoPoint> {
    let (lat, lon) = value.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    (lat.is_finite() && lon.is_finite()).then(|| geo(lon, lat))
}

/// Read every sensor row from a traffic table
///
/// # Errors
///
/// - [`InputError::MissingHeader`] if the input has no non-blank line
/// - [`InputError::MissingColumn`] if an hourly column is absent, or no column
///   holds coordinates
/// - [`InputError::ShortRow`], [`InputError::MalformedCoordinate`] or
///   [`InputError::MalformedValue`] naming the 1-based line of a bad row
/// - [`InputError::Io`] if reading fails
pub fn parse_traffic_table<R: BufRead>(
    reader: R,
    format: &TrafficTableFormat,
) -> Result<Vec<TrafficPoint>, InputError> {
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(i, line)| line.map(|l| (i + 1, l)));

    let header_line = loop {
        match lines.next() {
            Some(line) => {
                let (_, text) = line?;
                if !text.trim().is_empty() {
                    break text;
                }
            }
            None => return Err(InputError::MissingHeader),
        }
    };
    let header_line = header_line.trim_start_matches('\u{feff}');
    let header = split_fields(header_line, format.delimiter);

    let mut hour_columns = [0_usize; HOURS_PER_DAY];
    for (hour, slot) in hour_columns.iter_mut().enumerate() {
        let name = format!("{hour:02}:00");
        *slot = header
            .iter()
            .position(|h| *h == name)
            .ok_or(InputError::MissingColumn(name))?;
    }

    let street_column = header.iter().position(|h| *h == format.street_column);
    let mut coord_column = header
        .iter()
        .position(|h| *h == format.coordinate_column);
    if coord_column.is_none() {
        debug!(
            "Traffic table has no `{}` column, detecting coordinates from data",
            format.coordinate_column
        );
    }

    let mut points = Vec::new();
    for line in lines {
        let (line_no, text) = line?;
        if text.trim().is_empty() {
            continue;
        }
        let fields = split_fields(&text, format.delimiter);

        let coord_idx = match coord_column {
            Some(idx) => idx,
            None => {
                let detected = fields
                    .iter()
                    .enumerate()
                    .find(|(idx, f)| !hour_columns.contains(idx) && parse_lat_lon(f).is_some())
                    .map(|(idx, _)| idx)
                    .ok_or_else(|| InputError::MissingColumn(format.coordinate_column.clone()))?;
                coord_column = Some(detected);
                detected
            }
        };

        let needed = hour_columns
            .iter()
            .copied()
            .chain(std::iter::once(coord_idx))
            .max()
            .unwrap_or(0);
        if fields.len() <= needed {
            return Err(InputError::ShortRow {
                line: line_no,
                expected: header.len(),
                found: fields.len(),
            });
        }

        let raw_coord = fields[coord_idx];
        let location = parse_lat_lon(raw_coord).ok_or_else(|| InputError::MalformedCoordinate {
            line: line_no,
            value: raw_coord.to_string(),
        })?;

        let mut hourly = [0.0_f32; HOURS_PER_DAY];
        for (hour, (&col, value)) in hour_columns.iter().zip(hourly.iter_mut()).enumerate() {
            let raw = fields[col];
            *value = raw
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| InputError::MalformedValue {
                    line: line_no,
                    column: format!("{hour:02}:00"),
                    value: raw.to_string(),
                })?;
        }

        let mut point = TrafficPoint::new(location, hourly);
        if let Some(name) = street_column
            .and_then(|idx| fields.get(idx))
            .filter(|name| !name.is_empty())
        {
            point = point.with_street(*name);
        }
        points.push(point);
    }

    debug!("Parsed {} traffic sensors", points.len());
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn header() -> String {
        let hours: Vec<String> = (0..24).map(|h| format!("{h:02}:00")).collect();
        format!("Ulica;Współrzędne;{}", hours.join(";"))
    }

    fn row(street: &str, coord: &str, base: u32) -> String {
        let values: Vec<String> = (0..24).map(|h| (base + h).to_string()).collect();
        format!("{street};{coord};{}", values.join(";"))
    }

    #[test]
    fn test_parses_rows_in_header_order() {
        let text = format!(
            "{}\n{}\n\n{}\n",
            header(),
            row("Dąbrowskiego", "52.41,16.89", 0),
            row("Kościelna", "\"52.42,16.91\"", 10)
        );
        let points = parse_traffic_table(text.as_bytes(), &TrafficTableFormat::default()).unwrap();
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[0].location.x, 16.89);
        assert_relative_eq!(points[0].location.y, 52.41);
        assert_eq!(points[0].hourly[0], 0.0);
        assert_eq!(points[0].hourly[23], 23.0);
        assert_eq!(points[1].hourly[5], 15.0);
        assert_eq!(points[0].street.as_deref(), Some("Dąbrowskiego"));
        assert_eq!(points[1].street.as_deref(), Some("Kościelna"));
    }

    #[test]
    fn test_hour_columns_may_be_reordered() {
        let mut hours: Vec<String> = (0..24).map(|h| format!("{h:02}:00")).collect();
        hours.reverse();
        let values: Vec<String> = (0..24).rev().map(|h| (h * 2).to_string()).collect();
        let text = format!(
            "Współrzędne;{}\n52.4,16.9;{}\n",
            hours.join(";"),
            values.join(";")
        );
        let points = parse_traffic_table(text.as_bytes(), &TrafficTableFormat::default()).unwrap();
        assert_eq!(points[0].hourly[3], 6.0);
        assert_eq!(points[0].hourly[23], 46.0);
        assert_eq!(points[0].street, None);
    }

    #[test]
    fn test_detects_coordinate_column_without_header_name() {
        let text = format!(
            "{}\n{}\n",
            header().replace("Współrzędne", "Coords"),
            row("Polna", "52.40,16.88", 1)
        );
        let points = parse_traffic_table(text.as_bytes(), &TrafficTableFormat::default()).unwrap();
        assert_relative_eq!(points[0].location.x, 16.88);
    }

    #[test]
    fn test_reports_offending_line() {
        let text = format!(
            "{}\n{}\n{}\n",
            header(),
            row("A", "52.40,16.88", 1),
            row("B", "not-a-coordinate", 1)
        );
        let err = parse_traffic_table(text.as_bytes(), &TrafficTableFormat::default()).unwrap_err();
        assert!(matches!(err, InputError::MalformedCoordinate { line: 3, .. }));

        let text = format!("{}\nA;52.4,16.8;1;2\n", header());
        let err = parse_traffic_table(text.as_bytes(), &TrafficTableFormat::default()).unwrap_err();
        assert!(matches!(err, InputError::ShortRow { line: 2, .. }));

        let text = format!("{}\n{}\n", header(), row("A", "52.4,16.8", 1).replace(";5;", ";x;"));
        let err = parse_traffic_table(text.as_bytes(), &TrafficTableFormat::default()).unwrap_err();
        assert!(matches!(err, InputError::MalformedValue { line: 2, .. }));
    }

    #[test]
    fn test_missing_header_and_columns() {
        let err = parse_traffic_table("\n\n".as_bytes(), &TrafficTableFormat::default()).unwrap_err();
        assert!(matches!(err, InputError::MissingHeader));

        let err = parse_traffic_table(
            "Współrzędne;00:00\n".as_bytes(),
            &TrafficTableFormat::default(),
        )
        .unwrap_err();
        assert!(matches!(err, InputError::MissingColumn(c) if c == "01:00"));
    }

    #[test]
    fn test_header_only_yields_no_points() {
        let points =
            parse_traffic_table(header().as_bytes(), &TrafficTableFormat::default()).unwrap();
        assert!(points.is_empty());
    }
}
