//! Fold collected samples into per-sensor daily profiles

use super::reading::{format_lat_lon, CongestionSample};
use crate::simulation::HOURS_PER_DAY;
use crate::traffic::{TrafficPoint, TrafficTableFormat};
use rustc_hash::FxHashMap;
use std::io::Write;

#[derive(Default)]
struct HourBuckets {
    sums: [f64; HOURS_PER_DAY],
    counts: [u32; HOURS_PER_DAY],
}

/// Average samples per location and hour of day
///
/// Samples are grouped by their exact coordinate; the result keeps the order
/// in which locations first appear and the street name first seen there.
/// Hours without samples read 0 (free flow).
#[must_use]
pub fn aggregate_hourly(samples: &[CongestionSample]) -> Vec<TrafficPoint> {
    let mut order = Vec::new();
    let mut buckets: FxHashMap<(u64, u64), HourBuckets> = FxHashMap::default();

    for sample in samples {
        let key = (sample.location.x.to_bits(), sample.location.y.to_bits());
        let entry = buckets.entry(key).or_insert_with(|| {
            order.push((key, sample.location, sample.street.clone()));
            HourBuckets::default()
        });
        let hour = usize::from(sample.hour) % HOURS_PER_DAY;
        entry.sums[hour] += f64::from(sample.congestion_pct);
        entry.counts[hour] += 1;
    }

    order
        .into_iter()
        .filter_map(|(key, location, street)| {
            let b = buckets.get(&key)?;
            let mut hourly = [0.0f32; HOURS_PER_DAY];
            for (h, value) in hourly.iter_mut().enumerate() {
                if b.counts[h] > 0 {
                    *value = (b.sums[h] / f64::from(b.counts[h])) as f32;
                }
            }
            let point = TrafficPoint::new(location, hourly);
            Some(if street.is_empty() {
                point
            } else {
                point.with_street(street)
            })
        })
        .collect()
}

/// Write profiles in the sensor table layout read by
/// [`parse_traffic_table`](crate::traffic::parse_traffic_table)
///
/// Columns are street, coordinate, then `00:00` to `23:00`. A sensor without a
/// street name gets an empty street field. Delimiters inside a street name are
/// replaced with spaces.
///
/// # Errors
///
/// Propagates write failures.
pub fn write_traffic_table<W: Write>(
    mut writer: W,
    points: &[TrafficPoint],
    format: &TrafficTableFormat,
) -> std::io::Result<()> {
    let d = format.delimiter;
    write!(writer, "{}{d}{}", format.street_column, format.coordinate_column)?;
    for h in 0..HOURS_PER_DAY {
        write!(writer, "{d}{h:02}:00")?;
    }
    writeln!(writer)?;

    for point in points {
        let street = point
            .street
            .as_deref()
            .unwrap_or_default()
            .replace(d, " ");
        write!(writer, "{street}{d}{}", format_lat_lon(&point.location))?;
        for value in &point.hourly {
            write!(writer, "{d}{value}")?;
        }
        writeln!(writer)?;
    }
    writer.flush()
}
