use crate::animator::{ease_in_out_cubic, smoothing_alpha, Progress, Transform};
use crate::constants::*;
use crate::distribution::lifted_sphere_point;
use crate::instances::MeshInstance;
use crate::state::FrameInput;
use glam::{Vec2, Vec3};
use rand::Rng;

/// Tree-top star.
///
/// Formed: slow spin about Y, any leftover tilt damped toward zero.
/// Chaos: erratic tilt from independent sine/cosine terms scaled by
/// progress. A constant pulse drives the scale in both states.
#[derive(Clone, Debug)]
pub struct StarAnimator {
    target: Vec3,
    chaos: Vec3,
    progress: Progress,
    /// Tilt about X and Z.
    tilt: Vec2,
    transform: Transform,
}

impl StarAnimator {
    pub fn new(target: Vec3, chaos: Vec3) -> Self {
        Self {
            target,
            chaos,
            progress: Progress::default(),
            tilt: Vec2::ZERO,
            transform: Transform::new(target, Default::default(), 1.0),
        }
    }

    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let chaos = lifted_sphere_point(rng, STAR_CHAOS_RADIUS, STAR_CHAOS_LIFT);
        Self::new(STAR_FORMED_POSITION, chaos)
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn tilt(&self) -> Vec2 {
        self.tilt
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn step(&mut self, frame: &FrameInput) {
        self.progress = self.progress.step(frame.dt, frame.state, STAR_RATE);
        let p = self.progress.value();
        let t = frame.elapsed;

        let translation = self.target.lerp(self.chaos, ease_in_out_cubic(p));
        let yaw = t * STAR_SPIN_SPEED;
        if p > STAR_TILT_THRESHOLD {
            self.tilt = Vec2::new((t * 3.0).sin() * p, (t * 2.0).cos() * p);
        } else {
            let damp = smoothing_alpha(STAR_TILT_DAMPING, frame.dt);
            self.tilt = self.tilt.lerp(Vec2::ZERO, damp);
        }
        let scale = 1.0 + (t * STAR_PULSE_FREQUENCY).sin() * STAR_PULSE_AMPLITUDE;
        self.transform = Transform::from_euler(
            translation,
            Vec3::new(self.tilt.x, yaw, self.tilt.y),
            scale,
        );
    }

    pub fn instance(&self) -> MeshInstance {
        let [r, g, b] = STAR_GOLD;
        MeshInstance::new(self.transform.matrix(), [r, g, b, 1.0])
    }
}
