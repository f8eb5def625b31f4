//! Engine tunables.
//!
//! Every field has a default, so a partial JSON file or a handful of
//! `ATLAS_*` environment variables is enough to override what matters.

use std::env;
use std::time::Duration;

use camera::{ControllerConfig, HistoryThresholds, ScaleExtent, TransitionDurations};
use catalog::{DEFAULT_LOOKUP_BASE_URL, DatasetLocations};
use layers::ScaleMode;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scale_min: f64,
    pub scale_max: f64,
    pub translate_padding: f64,
    pub keyboard_zoom_step: f64,
    pub keyboard_pan_step: f64,
    pub wheel_delta_factor: f64,
    pub ctrl_wheel_boost: f64,
    pub keyboard_transition_ms: f64,
    pub history_transition_ms: f64,
    pub reset_transition_ms: f64,
    pub focus_transition_ms: f64,
    pub focus_max_scale: f64,
    pub focus_fill: f64,
    pub history_translate_px: f64,
    pub history_scale: f64,
    pub load_timeout_ms: u64,
    /// Directory or `http(s)://` base the dataset locations resolve against.
    pub data_base: String,
    pub locations: DatasetLocations,
    pub lookup_base_url: String,
    pub lookup_timeout_ms: u64,
    pub default_scale_mode: ScaleMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let controller = ControllerConfig::default();
        Self {
            scale_min: controller.scale_extent.min,
            scale_max: controller.scale_extent.max,
            translate_padding: controller.translate_padding,
            keyboard_zoom_step: controller.keyboard_zoom_step,
            keyboard_pan_step: controller.keyboard_pan_step,
            wheel_delta_factor: controller.wheel_delta_factor,
            ctrl_wheel_boost: controller.ctrl_wheel_boost,
            keyboard_transition_ms: controller.durations.keyboard_ms,
            history_transition_ms: controller.durations.history_ms,
            reset_transition_ms: controller.durations.reset_ms,
            focus_transition_ms: controller.durations.focus_ms,
            focus_max_scale: controller.focus_max_scale,
            focus_fill: controller.focus_fill,
            history_translate_px: controller.history.translate_px,
            history_scale: controller.history.scale,
            load_timeout_ms: 10_000,
            data_base: ".".to_string(),
            locations: DatasetLocations::default(),
            lookup_base_url: DEFAULT_LOOKUP_BASE_URL.to_string(),
            lookup_timeout_ms: 8_000,
            default_scale_mode: ScaleMode::Absolute,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(payload).map_err(|e| EngineError::Config {
            source: "json".to_string(),
            reason: e.to_string(),
        })?;
        Ok(config.sanitized())
    }

    /// Defaults overridden by `ATLAS_*` variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Self {
        let config = Self {
            scale_min: env_var_f64("ATLAS_SCALE_MIN", self.scale_min),
            scale_max: env_var_f64("ATLAS_SCALE_MAX", self.scale_max),
            translate_padding: env_var_f64("ATLAS_TRANSLATE_PADDING", self.translate_padding),
            keyboard_zoom_step: env_var_f64("ATLAS_KEYBOARD_ZOOM_STEP", self.keyboard_zoom_step),
            keyboard_pan_step: env_var_f64("ATLAS_KEYBOARD_PAN_STEP", self.keyboard_pan_step),
            focus_max_scale: env_var_f64("ATLAS_FOCUS_MAX_SCALE", self.focus_max_scale),
            load_timeout_ms: env_var_u64("ATLAS_LOAD_TIMEOUT_MS", self.load_timeout_ms),
            lookup_timeout_ms: env_var_u64("ATLAS_LOOKUP_TIMEOUT_MS", self.lookup_timeout_ms),
            data_base: env::var("ATLAS_DATA_BASE").unwrap_or(self.data_base),
            lookup_base_url: env::var("ATLAS_LOOKUP_URL").unwrap_or(self.lookup_base_url),
            default_scale_mode: env::var("ATLAS_SCALE_MODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.default_scale_mode),
            ..self
        };
        config.sanitized()
    }

    /// Replaces values the controller cannot work with by their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.scale_min) || !positive(self.scale_max) {
            tracing::warn!(
                min = self.scale_min,
                max = self.scale_max,
                "invalid scale extent, using defaults"
            );
            self.scale_min = defaults.scale_min;
            self.scale_max = defaults.scale_max;
        }
        if !positive(self.keyboard_zoom_step) {
            tracing::warn!(value = self.keyboard_zoom_step, "invalid keyboard zoom step");
            self.keyboard_zoom_step = defaults.keyboard_zoom_step;
        }
        if !self.translate_padding.is_finite() {
            tracing::warn!("invalid translate padding");
            self.translate_padding = defaults.translate_padding;
        }
        for (name, value, fallback) in [
            ("keyboard", &mut self.keyboard_transition_ms, defaults.keyboard_transition_ms),
            ("history", &mut self.history_transition_ms, defaults.history_transition_ms),
            ("reset", &mut self.reset_transition_ms, defaults.reset_transition_ms),
            ("focus", &mut self.focus_transition_ms, defaults.focus_transition_ms),
        ] {
            if !value.is_finite() || *value < 0.0 {
                tracing::warn!(transition = name, value = *value, "invalid transition duration");
                *value = fallback;
            }
        }
        self
    }

    pub fn controller(&self) -> ControllerConfig {
        ControllerConfig {
            scale_extent: ScaleExtent::new(self.scale_min, self.scale_max),
            translate_padding: self.translate_padding,
            keyboard_zoom_step: self.keyboard_zoom_step,
            keyboard_pan_step: self.keyboard_pan_step,
            wheel_delta_factor: self.wheel_delta_factor,
            ctrl_wheel_boost: self.ctrl_wheel_boost,
            focus_max_scale: self.focus_max_scale,
            focus_fill: self.focus_fill,
            durations: TransitionDurations {
                keyboard_ms: self.keyboard_transition_ms,
                history_ms: self.history_transition_ms,
                reset_ms: self.reset_transition_ms,
                focus_ms: self.focus_transition_ms,
            },
            history: HistoryThresholds {
                translate_px: self.history_translate_px,
                scale: self.history_scale,
            },
        }
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn data_is_remote(&self) -> bool {
        self.data_base.starts_with("http://") || self.data_base.starts_with("https://")
    }
}

fn env_var_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_var_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
