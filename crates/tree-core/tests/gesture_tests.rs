// Host-side tests for the open-hand classifier and tracker.

use smallvec::smallvec;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tree_core::gesture::*;
use tree_core::signal;
use tree_core::{GestureConfig, TreeError, TreeResult, TreeState};

/// A hand whose five fingertips all sit `reach` away from the wrist.
fn hand(reach: f32) -> HandLandmarks {
    let wrist = Landmark::new(0.5, 0.8, 0.0);
    let mut pts = [wrist; LANDMARK_COUNT];
    for (k, &tip) in FINGERTIPS.iter().enumerate() {
        let angle = -std::f32::consts::FRAC_PI_2 + (k as f32 - 2.0) * 0.3;
        pts[tip] = Landmark::new(
            wrist.x + reach * angle.cos(),
            wrist.y + reach * angle.sin(),
            0.1,
        );
    }
    HandLandmarks::new(pts)
}

fn open_hand() -> HandLandmarks {
    hand(0.35)
}

fn fist() -> HandLandmarks {
    hand(0.12)
}

#[test]
fn openness_is_mean_planar_fingertip_distance() {
    assert!((hand(0.3).openness() - 0.3).abs() < 1e-5);
    // z does not contribute
    let mut pts = *hand(0.2).points();
    pts[8].z = 5.0;
    assert!((HandLandmarks::new(pts).openness() - 0.2).abs() < 1e-5);
}

#[test]
fn landmark_parsing_rejects_wrong_counts() {
    let short = vec![Landmark::default(); 20];
    match HandLandmarks::from_slice(&short) {
        Err(TreeError::LandmarkCount { expected, got }) => {
            assert_eq!(expected, 21);
            assert_eq!(got, 20);
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(HandLandmarks::from_flat(&[0.0; 60]).is_err());
    let flat: Vec<f32> = (0..63).map(|i| i as f32).collect();
    let h = HandLandmarks::from_flat(&flat).unwrap();
    assert_eq!(h.points()[1], Landmark::new(3.0, 4.0, 5.0));
}

#[test]
fn window_evicts_oldest_sample() {
    let mut w = GestureWindow::new(3);
    for open in [true, true, true, false, false] {
        w.push(open);
    }
    assert_eq!(w.len(), 3);
    assert_eq!(w.open_votes(), 1);
    assert!(!w.majority_open());
}

#[test]
fn huge_window_capacity_does_not_preallocate() {
    let mut w = GestureWindow::new(usize::MAX);
    assert_eq!(w.capacity(), usize::MAX);
    for _ in 0..100 {
        w.push(true);
    }
    assert_eq!(w.len(), 100);
    assert!(!w.majority_open());
    assert_eq!(GestureWindow::new(0).capacity(), 1);
}

#[test]
fn six_open_then_four_closed_is_open() {
    let mut c = GestureClassifier::new(GestureConfig::default());
    for _ in 0..6 {
        c.observe(&[open_hand()]);
    }
    for _ in 0..4 {
        c.observe(&[fist()]);
    }
    assert_eq!(c.window().open_votes(), 6);
    assert_eq!(c.state(), TreeState::Chaos);
}

#[test]
fn five_open_five_closed_stays_closed() {
    let mut c = GestureClassifier::new(GestureConfig::default());
    for _ in 0..5 {
        c.observe(&[open_hand()]);
    }
    for _ in 0..5 {
        c.observe(&[fist()]);
    }
    assert_eq!(c.window().open_votes(), 5);
    assert_eq!(c.state(), TreeState::Formed);
}

#[test]
fn classifier_emits_only_on_change() {
    let mut c = GestureClassifier::new(GestureConfig::default());
    let mut changes = Vec::new();
    for _ in 0..20 {
        if let Some(s) = c.observe(&[open_hand()]) {
            changes.push(s);
        }
    }
    for _ in 0..20 {
        if let Some(s) = c.observe(&[fist()]) {
            changes.push(s);
        }
    }
    assert_eq!(changes, vec![TreeState::Chaos, TreeState::Formed]);
}

#[test]
fn frame_without_hand_holds_state() {
    let mut c = GestureClassifier::new(GestureConfig::default());
    for _ in 0..10 {
        c.observe(&[open_hand()]);
    }
    assert_eq!(c.state(), TreeState::Chaos);
    let before = c.window().len();
    for _ in 0..50 {
        assert_eq!(c.observe(&[]), None);
    }
    assert_eq!(c.state(), TreeState::Chaos);
    assert_eq!(c.window().len(), before);
}

#[test]
fn only_first_hand_is_classified() {
    let mut c = GestureClassifier::new(GestureConfig {
        open_threshold: 0.25,
        window: 1,
    });
    assert_eq!(c.observe(&[fist(), open_hand()]), None);
    assert_eq!(c.observe(&[open_hand(), fist()]), Some(TreeState::Chaos));
}

#[test]
fn threshold_and_window_are_configurable() {
    let mut c = GestureClassifier::new(GestureConfig {
        open_threshold: 0.4,
        window: 3,
    });
    // 0.35 counts as closed with the stricter threshold
    for _ in 0..5 {
        c.observe(&[open_hand()]);
    }
    assert_eq!(c.state(), TreeState::Formed);
    c.observe(&[hand(0.5)]);
    assert_eq!(c.state(), TreeState::Formed);
    c.observe(&[hand(0.5)]);
    assert_eq!(c.state(), TreeState::Chaos);
}

// ---------------- Tracker ----------------

struct ScriptedSource {
    frames: VecDeque<TreeResult<Hands>>,
    closes: Arc<AtomicUsize>,
}

impl LandmarkSource for ScriptedSource {
    type Frame = ();

    fn detect(&mut self, _frame: &(), _timestamp_ms: f64) -> TreeResult<Hands> {
        self.frames.pop_front().unwrap_or_else(|| Ok(Hands::new()))
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

fn scripted(frames: Vec<TreeResult<Hands>>, closes: &Arc<AtomicUsize>) -> ScriptedSource {
    ScriptedSource {
        frames: frames.into(),
        closes: Arc::clone(closes),
    }
}

#[test]
fn tracker_callback_fires_once_per_transition() {
    let closes = Arc::new(AtomicUsize::new(0));
    let mut frames: Vec<TreeResult<Hands>> = Vec::new();
    frames.extend((0..15).map(|_| Ok(smallvec![open_hand()])));
    frames.extend((0..15).map(|_| Ok(smallvec![fist()])));
    let source = scripted(frames, &closes);

    let (writer, reader) = signal::channel();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_cb = Arc::clone(&seen);
    let mut tracker = GestureTracker::start(|| Ok(source), writer, GestureConfig::default())
        .with_callback(move |s| seen_cb.lock().unwrap().push(s));

    let mut saw_chaos = false;
    for i in 0..30 {
        tracker.step(&(), i as f64 * 33.0);
        saw_chaos |= reader.snapshot() == TreeState::Chaos;
    }
    assert!(saw_chaos);
    assert_eq!(reader.snapshot(), TreeState::Formed);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![TreeState::Chaos, TreeState::Formed]
    );
}

#[test]
fn tracker_init_failure_leaves_formed_and_inert() {
    let (writer, reader) = signal::channel();
    let mut tracker: GestureTracker<ScriptedSource> = GestureTracker::start(
        || Err(TreeError::DetectorUnavailable("no camera".into())),
        writer,
        GestureConfig::default(),
    );
    assert!(matches!(tracker.status(), TrackerStatus::Unavailable(_)));
    assert_eq!(tracker.step(&(), 0.0), None);
    for _ in 0..20 {
        assert_eq!(tracker.observe(&[open_hand()]), None);
    }
    assert_eq!(reader.snapshot(), TreeState::Formed);
}

#[test]
fn tracker_detector_error_falls_back_to_formed() {
    let closes = Arc::new(AtomicUsize::new(0));
    let mut frames: Vec<TreeResult<Hands>> = (0..10).map(|_| Ok(smallvec![open_hand()])).collect();
    frames.push(Err(TreeError::DetectorUnavailable("camera unplugged".into())));
    frames.extend((0..10).map(|_| Ok(smallvec![open_hand()])));
    let source = scripted(frames, &closes);

    let (writer, reader) = signal::channel();
    let mut tracker = GestureTracker::start(|| Ok(source), writer, GestureConfig::default());
    for i in 0..10 {
        tracker.step(&(), i as f64);
    }
    assert_eq!(reader.snapshot(), TreeState::Chaos);

    assert_eq!(tracker.step(&(), 10.0), None);
    assert!(matches!(tracker.status(), TrackerStatus::Unavailable(_)));
    assert_eq!(reader.snapshot(), TreeState::Formed);
    assert_eq!(closes.load(Ordering::SeqCst), 1);

    // Further frames are ignored
    for i in 11..30 {
        tracker.step(&(), i as f64);
    }
    assert_eq!(reader.snapshot(), TreeState::Formed);
}

#[test]
fn tracker_shutdown_closes_source_exactly_once() {
    let closes = Arc::new(AtomicUsize::new(0));
    let source = scripted(Vec::new(), &closes);
    let (writer, _reader) = signal::channel();
    let mut tracker = GestureTracker::start(|| Ok(source), writer, GestureConfig::default());
    tracker.shutdown();
    tracker.shutdown();
    assert_eq!(*tracker.status(), TrackerStatus::Closed);
    drop(tracker);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn detector_failure_after_shutdown_keeps_tracker_closed() {
    let closes = Arc::new(AtomicUsize::new(0));
    let source = scripted(Vec::new(), &closes);
    let (writer, reader) = signal::channel();
    let mut tracker = GestureTracker::start(|| Ok(source), writer, GestureConfig::default());
    tracker.shutdown();
    tracker.disable("camera permission revoked");
    assert_eq!(*tracker.status(), TrackerStatus::Closed);
    assert_eq!(reader.snapshot(), TreeState::Formed);
    drop(tracker);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn tracker_drop_closes_source() {
    let closes = Arc::new(AtomicUsize::new(0));
    {
        let source = scripted(Vec::new(), &closes);
        let (writer, _reader) = signal::channel();
        let _tracker = GestureTracker::start(|| Ok(source), writer, GestureConfig::default());
    }
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn signal_publish_reports_changes() {
    let (writer, reader) = signal::channel();
    assert_eq!(reader.snapshot(), TreeState::Formed);
    assert!(!writer.publish(TreeState::Formed));
    assert!(writer.publish(TreeState::Chaos));
    assert!(!writer.publish(TreeState::Chaos));
    let other = reader.clone();
    assert_eq!(other.snapshot(), TreeState::Chaos);
}
