//! Runtime configuration.
//!
//! Defaults come from [`crate::constants`]; `from_env` overlays a handful of
//! `GRAND_TREE_*` variables so the gesture heuristics can be calibrated
//! without rebuilding.

use crate::constants::*;
use crate::error::{TreeError, TreeResult};
use std::str::FromStr;

/// Thresholds for the open-hand classifier.
///
/// - `open_threshold`: mean wrist-to-fingertip distance (normalized image
///   units) above which a frame counts as "open"
/// - `window`: number of recent frames in the majority vote
#[derive(Clone, Debug, PartialEq)]
pub struct GestureConfig {
    pub open_threshold: f32,
    pub window: usize,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            open_threshold: GESTURE_OPEN_THRESHOLD,
            window: GESTURE_WINDOW,
        }
    }
}

/// Population and shape of the generated scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneParams {
    pub foliage_count: usize,
    pub ornament_count: usize,
    pub star_count: usize,
    pub tree_height: f32,
    pub foliage_radius: f32,
    pub ornament_radius: f32,
    pub photo_radius: f32,
    pub cone_jitter: f32,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            foliage_count: FOLIAGE_COUNT,
            ornament_count: ORNAMENT_COUNT,
            star_count: STARFIELD_COUNT,
            tree_height: TREE_HEIGHT,
            foliage_radius: FOLIAGE_RADIUS,
            ornament_radius: ORNAMENT_RADIUS,
            photo_radius: PHOTO_RADIUS,
            cone_jitter: CONE_JITTER,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeConfig {
    pub seed: u64,
    pub scene: SceneParams,
    pub gesture: GestureConfig,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            scene: SceneParams::default(),
            gesture: GestureConfig::default(),
        }
    }
}

impl TreeConfig {
    /// Defaults overlaid with any `GRAND_TREE_*` variables from the process
    /// environment, then validated.
    pub fn from_env() -> TreeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`TreeConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> TreeResult<Self> {
        let mut cfg = Self::default();
        if let Some(v) = parse_var(&lookup, "GRAND_TREE_SEED")? {
            cfg.seed = v;
        }
        if let Some(v) = parse_var(&lookup, "GRAND_TREE_GESTURE_THRESHOLD")? {
            cfg.gesture.open_threshold = v;
        }
        if let Some(v) = parse_var(&lookup, "GRAND_TREE_GESTURE_WINDOW")? {
            cfg.gesture.window = v;
        }
        if let Some(v) = parse_var(&lookup, "GRAND_TREE_FOLIAGE_COUNT")? {
            cfg.scene.foliage_count = v;
        }
        if let Some(v) = parse_var(&lookup, "GRAND_TREE_ORNAMENT_COUNT")? {
            cfg.scene.ornament_count = v;
        }
        if let Some(v) = parse_var(&lookup, "GRAND_TREE_STAR_COUNT")? {
            cfg.scene.star_count = v;
        }
        cfg.validate()?;
        log::debug!("[config] {:?}", cfg);
        Ok(cfg)
    }

    pub fn validate(&self) -> TreeResult<()> {
        let g = &self.gesture;
        if !(g.open_threshold.is_finite() && g.open_threshold > 0.0) {
            return Err(TreeError::InvalidConfig(format!(
                "gesture threshold must be positive, got {}",
                g.open_threshold
            )));
        }
        if g.window == 0 || g.window > GESTURE_WINDOW_MAX {
            return Err(TreeError::InvalidConfig(format!(
                "gesture window must hold 1..={GESTURE_WINDOW_MAX} samples, got {}",
                g.window
            )));
        }
        let s = &self.scene;
        for (name, value) in [
            ("tree height", s.tree_height),
            ("foliage radius", s.foliage_radius),
            ("ornament radius", s.ornament_radius),
            ("photo radius", s.photo_radius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(TreeError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(s.cone_jitter.is_finite() && s.cone_jitter >= 0.0) {
            return Err(TreeError::InvalidConfig(format!(
                "cone jitter must be non-negative, got {}",
                s.cone_jitter
            )));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> TreeResult<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| TreeError::InvalidConfig(format!("{key}={raw:?} is not a valid value"))),
    }
}
