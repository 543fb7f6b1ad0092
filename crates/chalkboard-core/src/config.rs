//! Engine tunables.
//!
//! Every field has a default, so hosts can deserialize a partial config
//! (e.g. from a JSON settings blob) and only override what they need.

use crate::shapes::{SerializableColor, ShapeStyle};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`Board`](crate::board::Board).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardConfig {
    /// Minimum viewport scale.
    pub min_scale: f64,
    /// Maximum viewport scale.
    pub max_scale: f64,
    /// Maximum number of retained history snapshots.
    pub history_cap: usize,
    /// Smallest width/height reachable by resizing, in scene units.
    pub min_resize: f64,
    /// Handle hit radius in device pixels.
    pub handle_radius: f64,
    /// Distance of the rotate handle above the top edge, in device pixels.
    pub rotate_handle_offset: f64,
    /// Offset applied to pasted objects, in scene units.
    pub paste_offset: f64,
    /// Font size for new text objects.
    pub default_font_size: f64,
    /// Size of new sticky notes.
    pub note_size: Size,
    /// Style applied to new objects.
    pub default_style: ShapeStyle,
    /// Background of new sticky notes.
    pub note_background: SerializableColor,
    pub gestures: GestureConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 10.0,
            history_cap: 50,
            min_resize: 20.0,
            handle_radius: 8.0,
            rotate_handle_offset: 25.0,
            paste_offset: 20.0,
            default_font_size: 20.0,
            note_size: Size::new(200.0, 200.0),
            default_style: ShapeStyle::default(),
            note_background: SerializableColor::note_yellow(),
            gestures: GestureConfig::default(),
        }
    }
}

/// Thresholds for classifying touch input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GestureConfig {
    /// Longest touch that still counts as a tap, and the double-tap window.
    pub tap_window: Duration,
    /// Hold time before a stationary touch becomes a long-press.
    pub long_press_delay: Duration,
    /// Movement (device pixels) beyond which a touch is no longer a tap.
    pub move_slop: f64,
    /// Zoom factor applied per mouse-wheel step.
    pub wheel_zoom_step: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_window: Duration::from_millis(300),
            long_press_delay: Duration::from_millis(500),
            move_slop: 10.0,
            wheel_zoom_step: 1.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: BoardConfig = serde_json::from_str(r#"{"historyCap": 10}"#).unwrap();
        assert_eq!(config.history_cap, 10);
        assert!((config.min_resize - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.gestures, GestureConfig::default());
    }
}
