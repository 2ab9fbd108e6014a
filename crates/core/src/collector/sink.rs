//! Where collected samples go, and how they are read back
//!
//! The on-disk format is one header-less, semicolon-separated line per sample:
//!
//! ```text
//! Dąbrowskiego;52.4125,16.8952;08:00;37
//! ```

use super::reading::{format_lat_lon, CongestionSample, MonitoredStreet};
use crate::error::{CollectorError, InputError};
use crate::traffic::{parse_lat_lon, TrafficTableFormat};
use std::io::{BufRead, Write};

/// Receives samples as the collector produces them
pub trait SampleSink: Send {
    /// # Errors
    ///
    /// Returns [`CollectorError::Sink`] if the sample cannot be stored.
    fn record(&mut self, sample: &CongestionSample) -> Result<(), CollectorError>;

    /// Called after every round
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Sink`] if buffered samples cannot be written.
    fn flush(&mut self) -> Result<(), CollectorError> {
        Ok(())
    }
}

impl SampleSink for Vec<CongestionSample> {
    fn record(&mut self, sample: &CongestionSample) -> Result<(), CollectorError> {
        self.push(sample.clone());
        Ok(())
    }
}

/// Appends samples as semicolon-separated lines
pub struct CsvSampleWriter<W: Write> {
    writer: W,
}

impl<W: Write> CsvSampleWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> SampleSink for CsvSampleWriter<W> {
    fn record(&mut self, sample: &CongestionSample) -> Result<(), CollectorError> {
        writeln!(
            self.writer,
            "{};{};{:02}:{:02};{}",
            sample.street,
            format_lat_lon(&sample.location),
            sample.hour,
            sample.minute,
            sample.congestion_pct
        )?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), CollectorError> {
        self.writer.flush()?;
        Ok(())
    }
}

fn parse_clock(value: &str) -> Option<(u8, u8)> {
    let (h, m) = value.split_once(':')?;
    let hour: u8 = h.trim().parse().ok()?;
    let minute: u8 = m.trim().parse().ok()?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}

/// Read samples written by [`CsvSampleWriter`]; blank lines are skipped
///
/// # Errors
///
/// Returns an [`InputError`] naming the 1-based line of the first bad row.
pub fn parse_samples<R: BufRead>(reader: R) -> Result<Vec<CongestionSample>, InputError> {
    let mut samples = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(';').map(str::trim).collect();
        if fields.len() < 4 {
            return Err(InputError::ShortRow {
                line: line_no,
                expected: 4,
                found: fields.len(),
            });
        }
        let location = parse_lat_lon(fields[1]).ok_or_else(|| InputError::MalformedCoordinate {
            line: line_no,
            value: fields[1].to_string(),
        })?;
        let (hour, minute) = parse_clock(fields[2]).ok_or_else(|| InputError::MalformedValue {
            line: line_no,
            column: "time".to_string(),
            value: fields[2].to_string(),
        })?;
        let congestion_pct = fields[3]
            .parse::<i32>()
            .map_err(|_| InputError::MalformedValue {
                line: line_no,
                column: "congestion".to_string(),
                value: fields[3].to_string(),
            })?;
        samples.push(CongestionSample {
            street: fields[0].to_string(),
            location,
            hour,
            minute,
            congestion_pct,
        });
    }
    Ok(samples)
}

/// Read the list of street points to poll
///
/// Expects a header with the street and coordinate columns named in `format`.
/// The aggregated sensor table has both, so it can be fed back in.
///
/// # Errors
///
/// Returns [`InputError::MissingHeader`], [`InputError::MissingColumn`] or a
/// row error naming the 1-based line.
pub fn parse_monitored_streets<R: BufRead>(
    reader: R,
    format: &TrafficTableFormat,
) -> Result<Vec<MonitoredStreet>, InputError> {
    let mut lines = reader.lines().enumerate();
    let header = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
            None => return Err(InputError::MissingHeader),
        }
    };
    let columns: Vec<String> = header
        .trim_start_matches('\u{feff}')
        .split(format.delimiter)
        .map(|c| c.trim().trim_matches('"').to_string())
        .collect();
    let find = |name: &str| {
        columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| InputError::MissingColumn(name.to_string()))
    };
    let street_idx = find(&format.street_column)?;
    let coord_idx = find(&format.coordinate_column)?;

    let mut streets = Vec::new();
    for (i, line) in lines {
        let line_no = i + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line
            .split(format.delimiter)
            .map(|f| f.trim().trim_matches('"'))
            .collect();
        if fields.len() <= street_idx.max(coord_idx) {
            return Err(InputError::ShortRow {
                line: line_no,
                expected: columns.len(),
                found: fields.len(),
            });
        }
        let location =
            parse_lat_lon(fields[coord_idx]).ok_or_else(|| InputError::MalformedCoordinate {
                line: line_no,
                value: fields[coord_idx].to_string(),
            })?;
        streets.push(MonitoredStreet {
            street: fields[street_idx].to_string(),
            location,
        });
    }
    Ok(streets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::geo;

    fn sample(street: &str, hour: u8, pct: i32) -> CongestionSample {
        CongestionSample {
            street: street.to_string(),
            location: geo(16.8952, 52.4125),
            hour,
            minute: 5,
            congestion_pct: pct,
        }
    }

    #[test]
    fn test_writer_format_and_parse_back() {
        let mut writer = CsvSampleWriter::new(Vec::new());
        writer.record(&sample("Dąbrowskiego", 8, 37)).unwrap();
        writer.record(&sample("Polna", 17, -4)).unwrap();
        writer.flush().unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            text.lines().next(),
            Some("Dąbrowskiego;52.4125,16.8952;08:05;37")
        );

        let parsed = parse_samples(text.as_bytes()).unwrap();
        assert_eq!(parsed, vec![sample("Dąbrowskiego", 8, 37), sample("Polna", 17, -4)]);
    }

    #[test]
    fn test_parse_samples_errors() {
        let err = parse_samples("A;52.4,16.9;25:00;3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::MalformedValue { line: 1, .. }));
        let err = parse_samples("\nA;52.4,16.9\n".as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::ShortRow { line: 2, .. }));
    }

    #[test]
    fn test_parse_monitored_streets() {
        let text = "Ulica;Współrzędne\nDąbrowskiego;52.4125,16.8952\n\nPolna;\"52.41,16.88\"\n";
        let streets = parse_monitored_streets(text.as_bytes(), &TrafficTableFormat::default()).unwrap();
        assert_eq!(streets.len(), 2);
        assert_eq!(streets[1].street, "Polna");
        assert_eq!(streets[1].location, geo(16.88, 52.41));

        let err = parse_monitored_streets(
            "Street;Współrzędne\n".as_bytes(),
            &TrafficTableFormat::default(),
        )
        .unwrap_err();
        assert!(matches!(err, InputError::MissingColumn(c) if c == "Ulica"));
    }
}
