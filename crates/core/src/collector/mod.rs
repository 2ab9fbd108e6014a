//! Scheduled congestion collection
//!
//! Polls a live [`FlowProvider`] for a list of street points, converts each
//! flow reading into a congestion percentage and appends timestamped samples
//! to a [`SampleSink`]. Collected samples are later folded into 24-hour
//! sensor profiles with [`aggregate_hourly`], which the simulation reads as
//! [`TrafficPoint`](crate::traffic::TrafficPoint)s.
//!
//! The collector runs on its own thread and shares nothing mutable with the
//! simulation. Cancelling its [`CancellationToken`] wakes it from any wait.
//!
//! ```
//! use smog_sim_core::collector::{CongestionCollector, CongestionSample, FlowProvider, FlowReading, MonitoredStreet};
//! use smog_sim_core::core_types::{geo, GeoPoint};
//! use smog_sim_core::CollectorError;
//!
//! struct Constant;
//!
//! impl FlowProvider for Constant {
//!     fn flow_at(&self, _: &GeoPoint) -> Result<FlowReading, CollectorError> {
//!         Ok(FlowReading::new(30.0, 50.0))
//!     }
//! }
//!
//! let streets = vec![MonitoredStreet { street: "Polna".into(), location: geo(16.9, 52.41) }];
//! let collector = CongestionCollector::new(Constant, streets);
//! let mut samples: Vec<CongestionSample> = Vec::new();
//! let report = collector.collect_round(&mut samples).unwrap();
//! assert_eq!(report.recorded, 1);
//! assert_eq!(samples[0].congestion_pct, 40);
//! ```

mod aggregate;
mod reading;
mod retry;
mod runner;
mod sink;

pub use aggregate::{aggregate_hourly, write_traffic_table};
pub use reading::{format_lat_lon, CongestionSample, FlowProvider, FlowReading, MonitoredStreet};
pub use retry::{CancellationToken, CollectorSchedule, RetryPolicy};
pub use runner::{
    Clock, CollectorHandle, CongestionCollector, RoundReport, SystemClock, ZonedClock,
};
pub use sink::{parse_monitored_streets, parse_samples, CsvSampleWriter, SampleSink};
