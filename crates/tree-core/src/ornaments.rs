//! Instanced ornament batch: hundreds of baubles addressed by slot index.

use crate::animator::{ease_in_out_cubic, Progress, Transform};
use crate::config::SceneParams;
use crate::constants::*;
use crate::distribution::{cone_surface, lifted_sphere_point};
use crate::instances::MeshInstance;
use crate::state::FrameInput;
use glam::Vec3;
use rand::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrnamentKind {
    Box,
    Ball,
    Light,
}

/// Per-instance ornament record. `id` equals its slot in the batch.
#[derive(Clone, Debug, PartialEq)]
pub struct OrnamentEntity {
    pub id: u32,
    pub kind: OrnamentKind,
    pub color: [f32; 3],
    pub target: Vec3,
    pub chaos: Vec3,
    pub scale: f32,
    pub rotation_speed: Vec3,
}

/// Ornaments share one progress; each slot offsets it by a fixed
/// `sin(index) * ORNAMENT_PHASE_VARIANCE` so the batch does not move in
/// lockstep.
#[derive(Clone, Debug)]
pub struct OrnamentBatch {
    ornaments: Vec<OrnamentEntity>,
    progress: Progress,
    rate: f32,
    elapsed: f32,
}

impl OrnamentBatch {
    pub fn new(ornaments: Vec<OrnamentEntity>, rate: f32) -> Self {
        Self {
            ornaments,
            progress: Progress::default(),
            rate,
            elapsed: 0.0,
        }
    }

    pub fn generate<R: Rng + ?Sized>(rng: &mut R, params: &SceneParams) -> Self {
        let count = params.ornament_count;
        let targets = cone_surface(
            rng,
            count,
            params.tree_height,
            params.ornament_radius,
            params.cone_jitter,
        );
        let ornaments = targets
            .into_iter()
            .enumerate()
            .map(|(i, target)| {
                let chaos = lifted_sphere_point(rng, ORNAMENT_CHAOS_RADIUS, CHAOS_LIFT);
                let color = *ORNAMENT_PALETTE.choose(rng).unwrap_or(&ORNAMENT_PALETTE[0]);
                OrnamentEntity {
                    id: i as u32,
                    kind: OrnamentKind::Ball,
                    color,
                    target,
                    chaos,
                    scale: rng.gen::<f32>() * 0.4 + 0.1,
                    rotation_speed: Vec3::new(rng.gen(), rng.gen(), rng.gen()),
                }
            })
            .collect();
        Self::new(ornaments, ORNAMENT_RATE)
    }

    pub fn len(&self) -> usize {
        self.ornaments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ornaments.is_empty()
    }

    pub fn ornaments(&self) -> &[OrnamentEntity] {
        &self.ornaments
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn step(&mut self, frame: &FrameInput) {
        self.progress = self.progress.step(frame.dt, frame.state, self.rate);
        self.elapsed = frame.elapsed;
    }

    /// Progress of slot `index` after its phase offset.
    #[inline]
    pub fn slot_progress(&self, index: usize) -> f32 {
        slot_progress(self.progress.value(), index)
    }

    pub fn transform(&self, index: usize) -> Transform {
        let o = &self.ornaments[index];
        ornament_transform(o, self.slot_progress(index), self.elapsed)
    }

    pub fn write_instances(&self, out: &mut Vec<MeshInstance>) {
        out.clear();
        out.reserve(self.len());
        for (i, o) in self.ornaments.iter().enumerate() {
            let t = ornament_transform(o, self.slot_progress(i), self.elapsed);
            out.push(MeshInstance::new(
                t.matrix(),
                [o.color[0], o.color[1], o.color[2], 1.0],
            ));
        }
    }
}

#[inline]
pub fn slot_progress(shared: f32, index: usize) -> f32 {
    let variance = (index as f32).sin() * ORNAMENT_PHASE_VARIANCE;
    (shared + variance).clamp(0.0, 1.0)
}

/// Placement for one ornament at `progress` (already phase-adjusted).
/// Spin grows with progress: near still on the tree, tumbling in the cloud.
pub fn ornament_transform(o: &OrnamentEntity, progress: f32, time: f32) -> Transform {
    let translation = o.target.lerp(o.chaos, ease_in_out_cubic(progress));
    let spin = 1.0 + progress * ORNAMENT_SPIN_BOOST;
    let euler = Vec3::new(
        time * o.rotation_speed.x * spin,
        time * o.rotation_speed.y * spin,
        0.0,
    );
    Transform::from_euler(translation, euler, o.scale)
}
