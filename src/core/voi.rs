//! VOI-Fenster (Window/Level) eines Viewports.

use serde::{Deserialize, Serialize};

/// Werte-Bereich `[lower, upper]`, der auf die Grauwert-Skala abgebildet wird.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiRange {
    pub lower: f32,
    pub upper: f32,
}

impl VoiRange {
    /// Kleinste erlaubte Fensterbreite.
    pub const MIN_WINDOW_WIDTH: f32 = 1.0;

    /// Erstellt den Bereich direkt aus Grenzen.
    pub fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }

    /// Erstellt den Bereich aus Fensterbreite und -zentrum.
    pub fn from_window(width: f32, center: f32) -> Self {
        let width = width.max(Self::MIN_WINDOW_WIDTH);
        Self {
            lower: center - width / 2.0,
            upper: center + width / 2.0,
        }
    }

    /// Fensterbreite.
    pub fn window_width(&self) -> f32 {
        self.upper - self.lower
    }

    /// Fensterzentrum.
    pub fn window_center(&self) -> f32 {
        (self.lower + self.upper) / 2.0
    }

    /// Verschiebt Breite und Zentrum um Deltas (Window-Level-Drag).
    pub fn adjusted(&self, width_delta: f32, center_delta: f32) -> Self {
        Self::from_window(
            self.window_width() + width_delta,
            self.window_center() + center_delta,
        )
    }
}

impl Default for VoiRange {
    /// Weichteilfenster (W 400 / L 40).
    fn default() -> Self {
        Self::from_window(400.0, 40.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_window_conversion() {
        let voi = VoiRange::from_window(400.0, 40.0);
        assert_relative_eq!(voi.lower, -160.0);
        assert_relative_eq!(voi.upper, 240.0);
        assert_relative_eq!(voi.window_width(), 400.0);
        assert_relative_eq!(voi.window_center(), 40.0);
    }

    #[test]
    fn test_adjusted_never_goes_below_min_width() {
        let voi = VoiRange::from_window(10.0, 0.0).adjusted(-100.0, 5.0);
        assert_relative_eq!(voi.window_width(), VoiRange::MIN_WINDOW_WIDTH);
        assert_relative_eq!(voi.window_center(), 5.0);
    }
}
