//! Point generators for the two layouts every entity blends between.
//!
//! All generators are pure: the caller owns the random source, so a seeded
//! `StdRng` reproduces the exact same sequence of points.
//!
//! Valid inputs are `height > 0` and `radius > 0`. `count == 0` yields an
//! empty set.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

/// (1 + sqrt 5) / 2
pub const GOLDEN_RATIO: f32 = 1.618_034;

/// Points on the lateral surface of an upright cone, laid out along a
/// golden-angle spiral.
///
/// Point `i` sits at height `(i / count) * height` with radius shrinking
/// linearly to zero at the apex; its angle is `TAU * i / GOLDEN_RATIO`.
/// Radius and height each receive uniform noise in `[-jitter/2, jitter/2)`.
/// The shape is re-centred so it spans `[-height/2, height/2]` before noise.
pub fn cone_surface<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    height: f32,
    base_radius: f32,
    jitter: f32,
) -> Vec<Vec3> {
    let mut points = Vec::with_capacity(count);
    for i in 0..count {
        let y = (i as f32 / count as f32) * height;
        let radius = base_radius * (1.0 - y / height);
        let theta = TAU * i as f32 / GOLDEN_RATIO;

        let r_noise = (rng.gen::<f32>() - 0.5) * jitter;
        let y_noise = (rng.gen::<f32>() - 0.5) * jitter;

        let r = radius + r_noise;
        points.push(Vec3::new(
            r * theta.cos(),
            y - height / 2.0 + y_noise,
            r * theta.sin(),
        ));
    }
    points
}

/// Uniform sample inside a ball of `radius` centred on the origin.
///
/// The radial term uses the cube root of a uniform variate so density is
/// constant per unit volume instead of piling up near the centre.
pub fn sphere_volume<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    let u = rng.gen::<f32>();
    let v = rng.gen::<f32>();
    let theta = TAU * u;
    let phi = (2.0 * v - 1.0).clamp(-1.0, 1.0).acos();
    let r = rng.gen::<f32>().cbrt() * radius;
    let sin_phi = phi.sin();
    Vec3::new(
        r * sin_phi * theta.cos(),
        r * sin_phi * theta.sin(),
        r * phi.cos(),
    )
}

/// Single point on the cone's lateral surface, uniform in height and angle.
///
/// Used for individually placed entities; independent of the spiral layout.
pub fn cone_point<R: Rng + ?Sized>(rng: &mut R, height: f32, base_radius: f32) -> Vec3 {
    let y = rng.gen::<f32>() * height;
    let radius = base_radius * (1.0 - y / height);
    let theta = rng.gen::<f32>() * TAU;
    Vec3::new(radius * theta.cos(), y - height / 2.0, radius * theta.sin())
}

/// `sphere_volume` shifted up by `lift`, the shape every chaos layout uses.
#[inline]
pub fn lifted_sphere_point<R: Rng + ?Sized>(rng: &mut R, radius: f32, lift: f32) -> Vec3 {
    sphere_volume(rng, radius) + Vec3::Y * lift
}
