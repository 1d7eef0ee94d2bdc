//! Keyboard-driven stand-in for a camera hand-pose detector, and the thread
//! that runs gesture inference against it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::prelude::*;
use tree_core::gesture::{
    GestureTracker, HandLandmarks, Hands, Landmark, LandmarkSource, FINGERTIPS, LANDMARK_COUNT,
};
use tree_core::signal::SignalWriter;
use tree_core::{GestureConfig, TreeResult};

const OPEN_REACH: f32 = 0.35;
const FIST_REACH: f32 = 0.12;
const JITTER: f32 = 0.02;
const INFERENCE_PERIOD: Duration = Duration::from_millis(33);

/// Produces one hand per frame whose fingertips spread or curl depending on
/// a flag toggled from the UI thread.
pub struct SyntheticHand {
    open: Arc<AtomicBool>,
    rng: StdRng,
}

impl SyntheticHand {
    pub fn new(open: Arc<AtomicBool>) -> Self {
        Self {
            open,
            rng: StdRng::from_entropy(),
        }
    }

    fn landmarks(&mut self, reach: f32) -> HandLandmarks {
        let wrist = Landmark::new(0.5, 0.85, 0.0);
        let mut points = [wrist; LANDMARK_COUNT];
        for (k, &tip) in FINGERTIPS.iter().enumerate() {
            let angle = -std::f32::consts::FRAC_PI_2 + (k as f32 - 2.0) * 0.3;
            let r = reach + (self.rng.gen::<f32>() - 0.5) * JITTER;
            points[tip] = Landmark::new(wrist.x + r * angle.cos(), wrist.y + r * angle.sin(), 0.0);
        }
        HandLandmarks::new(points)
    }
}

impl LandmarkSource for SyntheticHand {
    type Frame = ();

    fn detect(&mut self, _frame: &(), _timestamp_ms: f64) -> TreeResult<Hands> {
        let reach = if self.open.load(Ordering::Relaxed) {
            OPEN_REACH
        } else {
            FIST_REACH
        };
        let mut hands = Hands::new();
        hands.push(self.landmarks(reach));
        Ok(hands)
    }

    fn close(&mut self) {
        log::debug!("[gesture] synthetic hand released");
    }
}

/// Background gesture inference. The tracker lives on the thread; the
/// render loop only ever sees the signal.
pub struct Inference {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Inference {
    pub fn spawn(
        writer: SignalWriter,
        config: GestureConfig,
        open: Arc<AtomicBool>,
    ) -> anyhow::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("gesture-inference".into())
            .spawn(move || {
                let mut tracker =
                    GestureTracker::start(|| Ok(SyntheticHand::new(open)), writer, config);
                let start = Instant::now();
                while !stop_flag.load(Ordering::Acquire) {
                    let ts = start.elapsed().as_secs_f64() * 1000.0;
                    tracker.step(&(), ts);
                    thread::sleep(INFERENCE_PERIOD);
                }
                tracker.shutdown();
            })?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Stop the loop and wait for the thread. Idempotent.
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("[gesture] inference thread panicked");
            }
        }
    }
}

impl Drop for Inference {
    fn drop(&mut self) {
        self.shutdown();
    }
}
