//! Landmark source fed by the JavaScript hand-pose detector.

use tree_core::gesture::{HandLandmarks, Hands, LandmarkSource, LANDMARK_COUNT};
use tree_core::{TreeError, TreeResult};

/// Floats per hand in the flat array the host passes in (x, y, z each).
pub const FLOATS_PER_HAND: usize = LANDMARK_COUNT * 3;

/// The host runs inference itself; each frame already carries the hands.
pub struct HostDetector;

impl LandmarkSource for HostDetector {
    type Frame = Hands;

    fn detect(&mut self, frame: &Hands, _timestamp_ms: f64) -> TreeResult<Hands> {
        Ok(frame.clone())
    }

    fn close(&mut self) {
        log::debug!("[gesture] host detector released");
    }
}

/// Split a flat `[x, y, z, ...]` array into hands of 21 landmarks.
pub fn parse_hands(flat: &[f32]) -> TreeResult<Hands> {
    if flat.len() % FLOATS_PER_HAND != 0 {
        return Err(TreeError::LandmarkCount {
            expected: LANDMARK_COUNT,
            got: flat.len() / 3,
        });
    }
    flat.chunks_exact(FLOATS_PER_HAND)
        .map(HandLandmarks::from_flat)
        .collect()
}
