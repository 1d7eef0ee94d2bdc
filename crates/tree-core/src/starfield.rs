//! Background star shell behind the tree.
//!
//! Stars are placed once on a spherical shell between `radius` and
//! `radius + depth`. They ignore the transition signal and the scene root;
//! the only motion is a shared twinkle on the sprite size.

use crate::constants::*;
use crate::instances::PointInstance;
use crate::state::FrameInput;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

#[derive(Clone, Debug)]
pub struct Starfield {
    points: Vec<Vec3>,
    sizes: Vec<f32>,
    radius: f32,
    depth: f32,
    twinkle: f32,
}

impl Starfield {
    /// `count` stars in the shell `[radius, radius + depth]`, each sized in
    /// `[factor / 2, factor)`.
    ///
    /// The distance starts at the outer edge and walks inward by a random
    /// fraction of `depth / count` per star, so later stars sit deeper.
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        count: usize,
        radius: f32,
        depth: f32,
        factor: f32,
    ) -> Self {
        let mut points = Vec::with_capacity(count);
        let mut sizes = Vec::with_capacity(count);
        let step = if count == 0 { 0.0 } else { depth / count as f32 };
        let mut r = radius + depth;
        for _ in 0..count {
            r -= step * rng.gen::<f32>();
            let phi = (1.0 - rng.gen::<f32>() * 2.0).clamp(-1.0, 1.0).acos();
            let theta = rng.gen::<f32>() * TAU;
            let sin_phi = phi.sin();
            points.push(Vec3::new(
                r * sin_phi * theta.sin(),
                r * phi.cos(),
                r * sin_phi * theta.cos(),
            ));
            sizes.push((0.5 + 0.5 * rng.gen::<f32>()) * factor);
        }
        Self {
            points,
            sizes,
            radius,
            depth,
            twinkle: 1.0,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    /// Inner and outer shell radius.
    pub fn band(&self) -> (f32, f32) {
        (self.radius, self.radius + self.depth)
    }

    /// Current size multiplier, in `[2/3, 4/3]`.
    pub fn twinkle(&self) -> f32 {
        self.twinkle
    }

    pub fn step(&mut self, frame: &FrameInput) {
        self.twinkle = (3.0 + (frame.elapsed * STARFIELD_SPEED + 100.0).sin()) / 3.0;
    }

    pub fn write_instances(&self, out: &mut Vec<PointInstance>) {
        let l = STARFIELD_LIGHTNESS;
        let scale = STARFIELD_SPRITE_SCALE * self.twinkle;
        out.clear();
        out.extend(
            self.points
                .iter()
                .zip(&self.sizes)
                .map(|(p, size)| PointInstance {
                    position: p.to_array(),
                    size: size * scale,
                    color: [l, l, l, 1.0],
                }),
        );
    }
}
