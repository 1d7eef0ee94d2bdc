//! The fine particle layer that makes up the tree's needles.

use crate::animator::{ease_in_out_cubic, Progress};
use crate::config::SceneParams;
use crate::constants::*;
use crate::distribution::{cone_surface, lifted_sphere_point};
use crate::instances::PointInstance;
use crate::state::FrameInput;
use glam::Vec3;
use rand::Rng;

/// Fixed-size particle set with precomputed formed/chaos positions.
///
/// Target, chaos and random arrays are never touched after generation; only
/// the shared progress (and the clock it was last stepped at) change.
#[derive(Clone, Debug)]
pub struct ParticleSet {
    targets: Vec<Vec3>,
    chaos: Vec<Vec3>,
    randoms: Vec<f32>,
    progress: Progress,
    rate: f32,
    elapsed: f32,
}

impl ParticleSet {
    /// Build from explicit layouts. Panics if the slices disagree in length.
    pub fn from_parts(targets: Vec<Vec3>, chaos: Vec<Vec3>, randoms: Vec<f32>, rate: f32) -> Self {
        assert_eq!(targets.len(), chaos.len(), "target/chaos length mismatch");
        assert_eq!(targets.len(), randoms.len(), "target/random length mismatch");
        Self {
            targets,
            chaos,
            randoms,
            progress: Progress::default(),
            rate,
            elapsed: 0.0,
        }
    }

    pub fn generate<R: Rng + ?Sized>(rng: &mut R, params: &SceneParams) -> Self {
        let count = params.foliage_count;
        let targets = cone_surface(
            rng,
            count,
            params.tree_height,
            params.foliage_radius,
            params.cone_jitter,
        );
        let mut chaos = Vec::with_capacity(count);
        let mut randoms = Vec::with_capacity(count);
        for _ in 0..count {
            chaos.push(lifted_sphere_point(rng, FOLIAGE_CHAOS_RADIUS, CHAOS_LIFT));
            randoms.push(rng.gen::<f32>());
        }
        Self::from_parts(targets, chaos, randoms, FOLIAGE_RATE)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[Vec3] {
        &self.targets
    }

    pub fn chaos(&self) -> &[Vec3] {
        &self.chaos
    }

    pub fn randoms(&self) -> &[f32] {
        &self.randoms
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn step(&mut self, frame: &FrameInput) {
        self.progress = self.progress.step(frame.dt, frame.state, self.rate);
        self.elapsed = frame.elapsed;
    }

    /// Position of particle `i` at the last stepped time.
    pub fn position(&self, i: usize) -> Vec3 {
        particle_position(
            self.targets[i],
            self.chaos[i],
            self.randoms[i],
            self.progress.value(),
            self.elapsed,
        )
    }

    pub fn write_instances(&self, out: &mut Vec<PointInstance>) {
        out.clear();
        out.reserve(self.len());
        let p = self.progress.value();
        let t = self.elapsed;
        for i in 0..self.len() {
            let rnd = self.randoms[i];
            out.push(PointInstance {
                position: particle_position(self.targets[i], self.chaos[i], rnd, p, t).to_array(),
                size: particle_size(rnd),
                color: particle_color(rnd, p, t),
            });
        }
    }
}

/// Eased blend plus an outward shimmer once the particle leaves the tree.
pub fn particle_position(target: Vec3, chaos: Vec3, random: f32, progress: f32, time: f32) -> Vec3 {
    let ease = ease_in_out_cubic(progress);
    let pos = target.lerp(chaos, ease);
    if ease > 0.0 {
        let wave = (time * SHIMMER_FREQUENCY + random * SHIMMER_PHASE_SPREAD).sin();
        pos + pos.normalize_or_zero() * wave * SHIMMER_AMPLITUDE * ease
    } else {
        pos
    }
}

/// World-space sprite size before perspective.
#[inline]
pub fn particle_size(random: f32) -> f32 {
    (6.0 * random + 4.0) * 0.01
}

/// Green needle colour with gold sparkles, drifting to gold dust in chaos.
pub fn particle_color(random: f32, progress: f32, time: f32) -> [f32; 4] {
    let deep = Vec3::from(FOLIAGE_DEEP);
    let light = Vec3::from(FOLIAGE_LIGHT);
    let gold = Vec3::from(GOLD);
    let mut c = deep.lerp(light, random);
    let blink = (time * 3.0 + random * 100.0).sin();
    if blink > 0.8 {
        c = c.lerp(gold, 0.8);
    }
    c = c.lerp(gold, progress * 0.5);
    [c.x, c.y, c.z, 1.0]
}
