use serde::{Deserialize, Serialize};

/// Which geolocation request produced a fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyTier {
    High,
    Low,
}

/// A latitude/longitude reading in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<AccuracyTier>,
}

impl GpsFix {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
        }
    }

    pub fn with_accuracy(mut self, tier: AccuracyTier) -> Self {
        self.accuracy = Some(tier);
        self
    }

    /// Coordinates recorded when a desktop submits without a fix.
    pub fn origin() -> Self {
        Self::new(0.0, 0.0)
    }
}
