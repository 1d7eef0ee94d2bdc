//! GPU-friendly per-instance records written by the scene every frame.

use glam::Mat4;

/// One foliage sprite.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
}

/// One mesh instance (ornament, star or photo frame).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl Default for MeshInstance {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            color: [1.0; 4],
        }
    }
}

impl MeshInstance {
    pub fn new(model: Mat4, color: [f32; 4]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }
}

/// A photo instance tagged with its stable arena slot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhotoInstance {
    pub slot: usize,
    pub instance: MeshInstance,
}

/// Reusable per-frame output buffers.
///
/// Ornament instances are in batch index order; photo instances are in
/// ascending slot order and skip empty slots.
#[derive(Clone, Debug, Default)]
pub struct SceneInstances {
    pub particles: Vec<PointInstance>,
    pub ornaments: Vec<MeshInstance>,
    pub star: MeshInstance,
    pub photos: Vec<PhotoInstance>,
    /// Background stars in world space; the root transform does not apply.
    pub backdrop: Vec<PointInstance>,
    /// Scene-root transform (offset and hover) to apply to everything above.
    pub root: [[f32; 4]; 4],
}
