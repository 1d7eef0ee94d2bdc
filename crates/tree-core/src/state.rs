//! Visual-side state types shared with the frontends.
//!
//! These types avoid referencing platform-specific APIs and are suitable for
//! use on both native and web targets.

use glam::{Mat4, Vec3};
use std::fmt;

/// The two layouts the whole tree blends between.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TreeState {
    /// Entities sit on their cone ("tree") positions.
    #[default]
    Formed,
    /// Entities scatter to their sphere-volume positions.
    Chaos,
}

impl TreeState {
    /// Progress value an animator is pulled toward in this state.
    #[inline]
    pub fn target(self) -> f32 {
        match self {
            TreeState::Formed => 0.0,
            TreeState::Chaos => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TreeState::Formed => "FORMED",
            TreeState::Chaos => "CHAOS",
        }
    }

    #[inline]
    pub(crate) fn to_bits(self) -> u8 {
        match self {
            TreeState::Formed => 0,
            TreeState::Chaos => 1,
        }
    }

    #[inline]
    pub(crate) fn from_bits(bits: u8) -> Self {
        if bits == 0 {
            TreeState::Formed
        } else {
            TreeState::Chaos
        }
    }
}

impl fmt::Display for TreeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot handed to every animator once per frame.
///
/// - `dt`: seconds since the previous frame (never negative)
/// - `elapsed`: seconds since the session started
/// - `state`: transition signal value read at the start of the frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub dt: f32,
    pub elapsed: f32,
    pub state: TreeState,
}

impl FrameInput {
    pub fn new(dt: f32, elapsed: f32, state: TreeState) -> Self {
        Self { dt, elapsed, state }
    }
}

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 4.0, 20.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 16.0 / 9.0,
            fovy_radians: 50f32.to_radians(),
            znear: 0.1,
            zfar: 200.0,
        }
    }
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Orbit limits for whatever camera controller the frontend uses.
#[derive(Clone, Debug)]
pub struct OrbitLimits {
    pub min_polar: f32,
    pub max_polar: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            min_polar: std::f32::consts::PI / 3.0,
            max_polar: std::f32::consts::PI / 1.5,
            min_distance: 10.0,
            max_distance: 30.0,
        }
    }
}

impl OrbitLimits {
    pub fn clamp(&self, orbit: Orbit) -> Orbit {
        Orbit {
            azimuth: orbit.azimuth,
            polar: orbit.polar.clamp(self.min_polar, self.max_polar),
            distance: orbit.distance.clamp(self.min_distance, self.max_distance),
        }
    }
}

/// Camera position around its target in spherical coordinates.
///
/// `polar` is measured down from +Y; `azimuth` is about Y with zero on +Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orbit {
    pub azimuth: f32,
    pub polar: f32,
    pub distance: f32,
}

impl Orbit {
    pub fn from_camera(camera: &Camera) -> Self {
        let offset = camera.eye - camera.target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return Self {
                azimuth: 0.0,
                polar: std::f32::consts::FRAC_PI_2,
                distance: 0.0,
            };
        }
        Self {
            azimuth: offset.x.atan2(offset.z),
            polar: (offset.y / distance).clamp(-1.0, 1.0).acos(),
            distance,
        }
    }

    pub fn eye(&self, target: Vec3) -> Vec3 {
        let s = self.polar.sin();
        target
            + Vec3::new(
                s * self.azimuth.sin(),
                self.polar.cos(),
                s * self.azimuth.cos(),
            ) * self.distance
    }
}

#[derive(Clone, Debug)]
pub enum Light {
    Ambient {
        intensity: f32,
    },
    Spot {
        position: Vec3,
        angle: f32,
        penumbra: f32,
        intensity: f32,
        color: [f32; 3],
    },
    Point {
        position: Vec3,
        intensity: f32,
        color: [f32; 3],
        distance: f32,
    },
}

#[derive(Clone, Debug)]
pub struct Bloom {
    pub luminance_threshold: f32,
    pub intensity: f32,
    pub radius: f32,
}

#[derive(Clone, Debug)]
pub struct Vignette {
    pub offset: f32,
    pub darkness: f32,
}

/// Inert render-surface setup, consumed once by the frontend.
#[derive(Clone, Debug)]
pub struct SceneSetup {
    pub camera: Camera,
    pub orbit: OrbitLimits,
    pub lights: Vec<Light>,
    pub bloom: Bloom,
    pub vignette: Vignette,
    pub background: [f32; 3],
}

impl SceneSetup {
    /// Rotate the camera by the given angles (radians) and scale its
    /// distance by `zoom`, staying inside the orbit limits.
    pub fn orbit_camera(&mut self, d_azimuth: f32, d_polar: f32, zoom: f32) {
        let mut orbit = Orbit::from_camera(&self.camera);
        orbit.azimuth += d_azimuth;
        orbit.polar += d_polar;
        if zoom.is_finite() && zoom > 0.0 {
            orbit.distance *= zoom;
        }
        let orbit = self.orbit.clamp(orbit);
        self.camera.eye = orbit.eye(self.camera.target);
    }
}

impl Default for SceneSetup {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            orbit: OrbitLimits::default(),
            lights: vec![
                Light::Ambient { intensity: 0.2 },
                Light::Spot {
                    position: Vec3::new(10.0, 15.0, 10.0),
                    angle: 0.3,
                    penumbra: 1.0,
                    intensity: 2.0,
                    color: [1.0, 0.933, 0.694],
                },
                Light::Point {
                    position: Vec3::new(-5.0, 5.0, 5.0),
                    intensity: 1.0,
                    color: [0.0, 1.0, 0.533],
                    distance: 20.0,
                },
            ],
            bloom: Bloom {
                luminance_threshold: 0.8,
                intensity: 1.5,
                radius: 0.6,
            },
            vignette: Vignette {
                offset: 0.1,
                darkness: 1.1,
            },
            background: crate::constants::BACKGROUND,
        }
    }
}
