use serde::{Deserialize, Serialize};

/// What a renderer shows next to one recorded frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSummary {
    /// Step index within the recorded day
    pub step: usize,
    pub hour: usize,
    pub minute: usize,
    /// Compass direction the wind blows towards, `?` when calm
    pub wind_label: String,
    pub wind_kmh: f32,
    /// Average extra congestion over road cells, whole percent, never negative
    pub mean_road_congestion_pct: u32,
    /// Highest concentration in the frame
    pub max_concentration: f32,
}

impl FrameSummary {
    /// `HH:MM` clock time of the frame
    #[must_use]
    pub fn clock_label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}
