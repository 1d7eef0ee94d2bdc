//! Progress smoothing shared by every animated entity.
//!
//! Each entity owns a [`Progress`] in `[0, 1]` that is pulled toward the
//! target of the current [`TreeState`] with frame-rate independent
//! exponential smoothing. Entity modules turn the eased progress into
//! positions, rotations and scales.

use crate::state::TreeState;
use glam::{EulerRot, Mat4, Quat, Vec3};

/// Ease-in-out cubic on `[0, 1]`.
#[inline]
pub fn ease_in_out_cubic(x: f32) -> f32 {
    if x < 0.5 {
        4.0 * x * x * x
    } else {
        1.0 - (-2.0 * x + 2.0).powi(3) / 2.0
    }
}

/// Fraction of the remaining distance covered in `dt` seconds at `rate`.
///
/// Always in `[0, 1]`: zero for `dt <= 0` (or NaN), approaching one for very
/// large `dt`.
#[inline]
pub fn smoothing_alpha(rate: f32, dt: f32) -> f32 {
    let k_dt = rate * dt;
    if !(k_dt > 0.0) {
        return 0.0;
    }
    (1.0 - (-k_dt).exp()).clamp(0.0, 1.0)
}

/// Blend scalar between formed (0) and chaos (1).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Progress {
    value: f32,
}

impl Progress {
    pub fn new(value: f32) -> Self {
        Self {
            value: if value.is_nan() {
                0.0
            } else {
                value.clamp(0.0, 1.0)
            },
        }
    }

    #[inline]
    pub fn value(self) -> f32 {
        self.value
    }

    #[inline]
    pub fn eased(self) -> f32 {
        ease_in_out_cubic(self.value)
    }

    /// One smoothing step toward `state`'s target. Pure; never overshoots.
    #[inline]
    pub fn step(self, dt: f32, state: TreeState, rate: f32) -> Self {
        let target = state.target();
        let alpha = smoothing_alpha(rate, dt);
        Self::new(self.value + (target - self.value) * alpha)
    }
}

/// Render-ready placement of a single mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn new(translation: Vec3, rotation: Quat, scale: f32) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Build a rotation from XYZ Euler angles, the order scene graphs use.
    pub fn from_euler(translation: Vec3, euler: Vec3, scale: f32) -> Self {
        Self::new(
            translation,
            Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z),
            scale,
        )
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.translation,
        )
    }
}

/// Gentle whole-tree hover: a slow bob plus a small sway.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hover {
    pub speed: f32,
    pub rotation_intensity: f32,
    pub float_intensity: f32,
}

impl Default for Hover {
    fn default() -> Self {
        Self {
            speed: 1.0,
            rotation_intensity: 0.2,
            float_intensity: 0.5,
        }
    }
}

impl Hover {
    pub fn transform(&self, elapsed: f32) -> Transform {
        let phase = elapsed / 4.0 * self.speed;
        let euler = Vec3::new(
            phase.cos() / 8.0 * self.rotation_intensity,
            phase.sin() / 8.0 * self.rotation_intensity,
            phase.sin() / 20.0 * self.rotation_intensity,
        );
        let bob = phase.sin() / 10.0 * self.float_intensity;
        Transform::from_euler(Vec3::Y * bob, euler, 1.0)
    }
}
