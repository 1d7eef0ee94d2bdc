//! Open-hand / fist classification from hand landmarks.
//!
//! The pipeline per inference frame:
//! 1. take the first detected hand (frames without a hand are skipped)
//! 2. average the planar wrist-to-fingertip distance over the five fingers
//! 3. call the frame "open" above `GestureConfig::open_threshold`
//! 4. push the vote into a bounded FIFO window
//! 5. the hand is "open" (CHAOS) when strictly more than half the window
//!    capacity voted open, otherwise FORMED
//! 6. publish only when the debounced state changes

use crate::config::GestureConfig;
use crate::constants::GESTURE_WINDOW_MAX;
use crate::error::{TreeError, TreeResult};
use crate::signal::SignalWriter;
use crate::state::TreeState;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Points per hand in the detector's convention.
pub const LANDMARK_COUNT: usize = 21;
pub const WRIST: usize = 0;
/// Thumb, index, middle, ring, pinky tips.
pub const FINGERTIPS: [usize; 5] = [4, 8, 12, 16, 20];

/// Normalized image-space landmark. `z` is relative depth and is carried
/// but not used by the classifier.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    fn planar_distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One tracked hand: exactly [`LANDMARK_COUNT`] ordered landmarks.
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    pub fn from_slice(points: &[Landmark]) -> TreeResult<Self> {
        let points: [Landmark; LANDMARK_COUNT] =
            points.try_into().map_err(|_| TreeError::LandmarkCount {
                expected: LANDMARK_COUNT,
                got: points.len(),
            })?;
        Ok(Self { points })
    }

    /// Parse interleaved `x, y, z` triples.
    pub fn from_flat(coords: &[f32]) -> TreeResult<Self> {
        if coords.len() != LANDMARK_COUNT * 3 {
            return Err(TreeError::LandmarkCount {
                expected: LANDMARK_COUNT,
                got: coords.len() / 3,
            });
        }
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        for (p, c) in points.iter_mut().zip(coords.chunks_exact(3)) {
            *p = Landmark::new(c[0], c[1], c[2]);
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    /// Mean planar distance from the wrist to the five fingertips.
    pub fn openness(&self) -> f32 {
        let wrist = &self.points[WRIST];
        let total: f32 = FINGERTIPS
            .iter()
            .map(|&i| self.points[i].planar_distance(wrist))
            .sum();
        total / FINGERTIPS.len() as f32
    }
}

/// Hands reported for one video frame. Usually zero or one.
pub type Hands = SmallVec<[HandLandmarks; 2]>;

/// Bounded FIFO of per-frame "hand open" votes.
#[derive(Clone, Debug)]
pub struct GestureWindow {
    samples: VecDeque<bool>,
    capacity: usize,
}

impl GestureWindow {
    /// A window of `capacity` votes. Zero is raised to one; the ring only
    /// preallocates up to [`GESTURE_WINDOW_MAX`] slots.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity.min(GESTURE_WINDOW_MAX)),
            capacity,
        }
    }

    /// Append a vote, evicting the oldest once over capacity.
    pub fn push(&mut self, open: bool) {
        self.samples.push_back(open);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn open_votes(&self) -> usize {
        self.samples.iter().filter(|&&open| open).count()
    }

    /// Strict majority against the full capacity, so a partially filled
    /// window needs the same number of open votes as a full one.
    pub fn majority_open(&self) -> bool {
        self.open_votes() * 2 > self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Edge-triggered open/closed state machine.
#[derive(Clone, Debug)]
pub struct GestureClassifier {
    config: GestureConfig,
    window: GestureWindow,
    state: TreeState,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        let window = GestureWindow::new(config.window);
        Self {
            config,
            window,
            state: TreeState::Formed,
        }
    }

    pub fn state(&self) -> TreeState {
        self.state
    }

    pub fn window(&self) -> &GestureWindow {
        &self.window
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Raw per-frame vote, before debouncing.
    pub fn is_open(&self, hand: &HandLandmarks) -> bool {
        hand.openness() > self.config.open_threshold
    }

    /// Feed one frame's vote; returns the new state only when it changed.
    pub fn push_vote(&mut self, open: bool) -> Option<TreeState> {
        self.window.push(open);
        let next = if self.window.majority_open() {
            TreeState::Chaos
        } else {
            TreeState::Formed
        };
        if next != self.state {
            self.state = next;
            Some(next)
        } else {
            None
        }
    }

    /// Classify one frame. Only the first hand is used; an empty frame
    /// holds the previous state and leaves the window untouched.
    pub fn observe(&mut self, hands: &[HandLandmarks]) -> Option<TreeState> {
        let hand = hands.first()?;
        let open = self.is_open(hand);
        log::trace!(
            "[gesture] openness={:.3} open={} votes={}/{}",
            hand.openness(),
            open,
            self.window.open_votes(),
            self.window.capacity()
        );
        self.push_vote(open)
    }

    /// Drop accumulated votes and return to FORMED.
    pub fn reset(&mut self) {
        self.window.clear();
        self.state = TreeState::Formed;
    }
}

/// External hand-pose detector.
///
/// Implementations own whatever camera/inference resources they need and
/// release them in `close`.
pub trait LandmarkSource {
    /// Video frame type handed to the detector.
    type Frame;

    /// Detect hands in `frame` captured at `timestamp_ms`. An empty result
    /// means no hand was visible.
    fn detect(&mut self, frame: &Self::Frame, timestamp_ms: f64) -> TreeResult<Hands>;

    /// Stop the camera and close the inference session.
    fn close(&mut self) {}
}

/// Whether gesture control is live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackerStatus {
    Active,
    /// Detector failed; the tree stays FORMED until restarted.
    Unavailable(String),
    Closed,
}

pub type StateCallback = Box<dyn FnMut(TreeState) + Send>;

/// Couples a landmark source, the classifier and the shared signal.
pub struct GestureTracker<S: LandmarkSource> {
    source: Option<S>,
    classifier: GestureClassifier,
    writer: SignalWriter,
    on_change: Option<StateCallback>,
    status: TrackerStatus,
}

impl<S: LandmarkSource> GestureTracker<S> {
    /// Build a tracker from a detector initializer. If `init` fails the
    /// tracker is created `Unavailable` and the signal stays FORMED; the
    /// host keeps running without gesture control.
    pub fn start(
        init: impl FnOnce() -> TreeResult<S>,
        writer: SignalWriter,
        config: GestureConfig,
    ) -> Self {
        let classifier = GestureClassifier::new(config);
        writer.publish(TreeState::Formed);
        match init() {
            Ok(source) => {
                log::info!("[gesture] detector ready");
                Self {
                    source: Some(source),
                    classifier,
                    writer,
                    on_change: None,
                    status: TrackerStatus::Active,
                }
            }
            Err(e) => {
                log::warn!("[gesture] disabled: {e}");
                Self {
                    source: None,
                    classifier,
                    writer,
                    on_change: None,
                    status: TrackerStatus::Unavailable(e.to_string()),
                }
            }
        }
    }

    /// Register the state-change callback. Invoked once per transition.
    pub fn with_callback(mut self, callback: impl FnMut(TreeState) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn status(&self) -> &TrackerStatus {
        &self.status
    }

    pub fn state(&self) -> TreeState {
        self.classifier.state()
    }

    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    /// Run the detector on one frame and publish any state change.
    pub fn step(&mut self, frame: &S::Frame, timestamp_ms: f64) -> Option<TreeState> {
        if self.status != TrackerStatus::Active {
            return None;
        }
        let source = self.source.as_mut()?;
        match source.detect(frame, timestamp_ms) {
            Ok(hands) => self.observe(&hands),
            Err(e) => {
                self.disable(e.to_string());
                None
            }
        }
    }

    /// Classify hands delivered by an external loop and publish any change.
    pub fn observe(&mut self, hands: &[HandLandmarks]) -> Option<TreeState> {
        if self.status != TrackerStatus::Active {
            return None;
        }
        let changed = self.classifier.observe(hands)?;
        self.emit(changed);
        Some(changed)
    }

    /// Mark the detector as failed: release it and fall back to FORMED.
    /// No-op once the tracker is already unavailable or closed.
    pub fn disable(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        if self.status != TrackerStatus::Active {
            return;
        }
        log::warn!("[gesture] detector lost, falling back to FORMED: {reason}");
        if let Some(mut source) = self.source.take() {
            source.close();
        }
        self.status = TrackerStatus::Unavailable(reason);
        if self.classifier.state() != TreeState::Formed {
            self.classifier.reset();
            self.emit(TreeState::Formed);
        }
    }

    /// Close the detector. Idempotent; also run on drop.
    pub fn shutdown(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.close();
            log::info!("[gesture] detector closed");
        }
        self.status = TrackerStatus::Closed;
    }

    fn emit(&mut self, state: TreeState) {
        self.writer.publish(state);
        log::info!("[gesture] state -> {state}");
        if let Some(cb) = self.on_change.as_mut() {
            cb(state);
        }
    }
}

impl<S: LandmarkSource> Drop for GestureTracker<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
