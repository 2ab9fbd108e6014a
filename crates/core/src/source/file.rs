//! File-backed providers
//!
//! Road networks are stored as a JSON array of provider records (the shape an
//! OSM edge export produces); traffic as the semicolon sensor table.

use super::{RoadNetworkSource, TrafficSource};
use crate::error::SourceError;
use crate::roads::{RoadNetwork, RoadRecord};
use crate::traffic::{parse_traffic_table, TrafficPoint, TrafficTableFormat};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

fn open(path: &Path) -> Result<BufReader<File>, SourceError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Road records saved as JSON
///
/// The place name is ignored; the file is the area.
#[derive(Debug, Clone)]
pub struct JsonRoadFile {
    path: PathBuf,
}

impl JsonRoadFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RoadNetworkSource for JsonRoadFile {
    fn fetch_roads(&self, place: &str) -> Result<RoadNetwork, SourceError> {
        let records: Vec<RoadRecord> =
            serde_json::from_reader(open(&self.path)?).map_err(|source| SourceError::Json {
                path: self.path.clone(),
                source,
            })?;
        let network = RoadNetwork::from_records(records)?;
        info!(
            "Loaded {} road segments for `{}` from {}",
            network.segments.len(),
            place,
            self.path.display()
        );
        Ok(network)
    }
}

/// Sensor table saved as semicolon CSV
#[derive(Debug, Clone)]
pub struct CsvTrafficFile {
    path: PathBuf,
    format: TrafficTableFormat,
}

impl CsvTrafficFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: TrafficTableFormat::default(),
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: TrafficTableFormat) -> Self {
        self.format = format;
        self
    }
}

impl TrafficSource for CsvTrafficFile {
    fn fetch_hourly_congestion(&self) -> Result<Vec<TrafficPoint>, SourceError> {
        let points = parse_traffic_table(open(&self.path)?, &self.format)?;
        info!(
            "Loaded {} traffic sensors from {}",
            points.len(),
            self.path.display()
        );
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("smog-sim-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_json_road_file() {
        let path = temp_path("roads.json");
        std::fs::write(
            &path,
            r#"[
                {"geometry": [[16.90, 52.40], [16.92, 52.41]], "highway": "primary", "lanes": "2", "name": "Dąbrowskiego", "length": 1650.0},
                {"geometry": [[16.91, 52.39], [16.91, 52.42]], "highway": ["residential", "service"], "length": 320.5}
            ]"#,
        )
        .unwrap();

        let network = JsonRoadFile::new(&path).fetch_roads("Jeżyce").unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(network.segments.len(), 2);
        assert_eq!(network.bounds.min_x(), 16.90);
        assert_eq!(network.bounds.max_y(), 52.42);
    }

    #[test]
    fn test_missing_file_names_path() {
        let path = temp_path("does-not-exist.json");
        let err = JsonRoadFile::new(&path).fetch_roads("x").unwrap_err();
        match err {
            SourceError::Io { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_csv_traffic_file() {
        let path = temp_path("traffic.csv");
        {
            let mut f = File::create(&path).unwrap();
            let hours: Vec<String> = (0..24).map(|h| format!("{h:02}:00")).collect();
            writeln!(f, "Ulica;Współrzędne;{}", hours.join(";")).unwrap();
            writeln!(f, "Polna;52.41,16.90;{}", vec!["12"; 24].join(";")).unwrap();
        }
        let points = CsvTrafficFile::new(&path).fetch_hourly_congestion().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].hourly[9], 12.0);
        assert_eq!(points[0].street.as_deref(), Some("Polna"));
    }

    #[test]
    fn test_aggregated_table_file_keeps_streets() {
        use crate::collector::{aggregate_hourly, write_traffic_table, CongestionSample};
        use crate::core_types::geo;

        let sample = |street: &str, lon: f64, hour: u8, pct: i32| CongestionSample {
            street: street.to_string(),
            location: geo(lon, 52.41),
            hour,
            minute: 0,
            congestion_pct: pct,
        };
        let points = aggregate_hourly(&[
            sample("Dąbrowskiego", 16.89, 8, 30),
            sample("Polna", 16.88, 8, 10),
            sample("Dąbrowskiego", 16.89, 8, 50),
        ]);

        let path = temp_path("aggregated.csv");
        write_traffic_table(
            File::create(&path).unwrap(),
            &points,
            &TrafficTableFormat::default(),
        )
        .unwrap();
        let loaded = CsvTrafficFile::new(&path).fetch_hourly_congestion().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].street.as_deref(), Some("Dąbrowskiego"));
        assert_eq!(loaded[1].street.as_deref(), Some("Polna"));
        assert_eq!(loaded[0].hourly[8], 40.0);
        assert_eq!(loaded[0].location, points[0].location);
    }
}
