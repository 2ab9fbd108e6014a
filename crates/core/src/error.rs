//! Error types for the smog simulation core
//!
//! Each concern gets its own enum so callers can match on what actually went
//! wrong; [`SmogError`] wraps them all for code that drives the full pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Rejected configuration values, caught before any component is built.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Grid must leave at least one interior cell inside the zeroed border
    #[error("grid size must be at least 3, got {0}")]
    InvalidGridSize(usize),

    /// A rate, ratio or physical constant is non-finite or out of range
    #[error("`{name}` must be finite and within [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// Background and traffic shares must split the emission exactly
    #[error("background ratio {background} and traffic ratio {traffic} must sum to 1.0")]
    RatioSum { background: f32, traffic: f32 },

    /// Steps may be fractional minutes long but never shorter than a minute
    #[error("steps per day must be within 1..=1440, got {0}")]
    InvalidStepsPerDay(usize),

    /// Hourly tables always carry one value per hour of the day
    #[error("hourly profile must have 24 entries, got {0}")]
    ProfileLength(usize),

    #[error("hourly profile `{name}` has invalid value {value} at hour {hour}")]
    ProfileValue {
        name: String,
        hour: usize,
        value: f32,
    },

    /// A warm-up day plus a recorded day are required
    #[error("simulation needs at least 2 days (warm-up + recorded), got {0}")]
    TooFewDays(usize),

    #[error("day `{0}` has an empty wind forecast")]
    EmptyForecast(String),

    #[error("day `{day}` wind bucket {bucket}: {reason}")]
    InvalidWind {
        day: String,
        bucket: usize,
        reason: String,
    },

    #[error("emission weight for `{class}` must be finite and non-negative, got {value}")]
    InvalidEmissionWeight { class: String, value: f32 },

    /// Precomputed grids must match the configured grid size
    #[error("grid `{name}` is {found_width}x{found_height}, expected {expected}x{expected}")]
    GridMismatch {
        name: &'static str,
        expected: usize,
        found_width: usize,
        found_height: usize,
    },

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Malformed geometry or tabular input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("bounding box is degenerate: x [{min_x}, {max_x}], y [{min_y}, {max_y}]")]
    DegenerateBounds {
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
    },

    #[error("road network contains no geometry")]
    EmptyNetwork,

    #[error("traffic table is missing column `{0}`")]
    MissingColumn(String),

    #[error("traffic table line {line}: expected {expected} fields, found {found}")]
    ShortRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("traffic table line {line}: malformed coordinate `{value}` (expected `lat,lon`)")]
    MalformedCoordinate { line: usize, value: String },

    #[error("traffic table line {line}, column `{column}`: malformed number `{value}`")]
    MalformedValue {
        line: usize,
        column: String,
        value: String,
    },

    #[error("traffic table is empty (no header line)")]
    MissingHeader,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures fetching road or traffic data from a provider.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("data source unavailable: {0}")]
    Unavailable(String),
}

/// Failures of the scheduled congestion collector.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Provider returned a reading that cannot be turned into a percentage
    #[error("invalid flow reading at {location}: current {current}, free-flow {free_flow}")]
    InvalidReading {
        location: String,
        current: f32,
        free_flow: f32,
    },

    #[error("flow provider failed: {0}")]
    Provider(String),

    #[error("giving up on `{street}` after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        street: String,
        attempts: u32,
        last_error: String,
    },

    #[error("failed to record sample: {0}")]
    Sink(#[from] std::io::Error),

    #[error("collector cancelled")]
    Cancelled,
}

/// Umbrella error for the full pipeline.
#[derive(Debug, Error)]
pub enum SmogError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Collector(#[from] CollectorError),
}
