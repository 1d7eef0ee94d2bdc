//! User photos hung on the tree, stored in a slot arena.
//!
//! Render backends address instances by index, so a photo keeps its slot
//! for its whole life. Removing a photo leaves an empty slot (a tombstone);
//! nothing is renumbered. The next added photo takes the lowest empty slot.
//! [`PhotoId`]s are never reused within a session.
//!
//! The texture handle `T` is owned by the entity: dropping the entity
//! (remove, clear, or dropping the arena) releases it.

use crate::animator::{ease_in_out_cubic, Progress, Transform};
use crate::constants::*;
use crate::distribution::{cone_point, lifted_sphere_point};
use crate::error::{TreeError, TreeResult};
use crate::instances::{MeshInstance, PhotoInstance};
use crate::state::FrameInput;
use fnv::FnvHashMap;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::{PI, TAU};
use std::fmt;

/// Session-unique photo identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhotoId(pub u64);

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "photo-{}", self.0)
    }
}

/// Per-photo motion state.
#[derive(Clone, Debug)]
pub struct PhotoMotion {
    pub target: Vec3,
    pub chaos: Vec3,
    pub rotation_speed: Vec3,
    pub wobble_offset: f32,
    progress: Progress,
    /// Accumulated XYZ Euler angles; chaos spin integrates into these.
    euler: Vec3,
    transform: Transform,
}

impl PhotoMotion {
    pub fn new(target: Vec3, chaos: Vec3, rotation_speed: Vec3, wobble_offset: f32) -> Self {
        Self {
            target,
            chaos,
            rotation_speed,
            wobble_offset,
            progress: Progress::default(),
            euler: Vec3::ZERO,
            transform: Transform::new(target, Default::default(), 1.0),
        }
    }

    pub fn generate<R: Rng + ?Sized>(rng: &mut R, height: f32, radius: f32) -> Self {
        let target = cone_point(rng, height, radius);
        let chaos = lifted_sphere_point(rng, PHOTO_CHAOS_RADIUS, CHAOS_LIFT);
        let mut speed = || (rng.gen::<f32>() - 0.5) * 2.0 * PHOTO_SPIN_SPEED_MAX;
        let rotation_speed = Vec3::new(speed(), speed(), speed());
        let wobble_offset = rng.gen::<f32>() * TAU;
        Self::new(target, chaos, rotation_speed, wobble_offset)
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn euler(&self) -> Vec3 {
        self.euler
    }

    /// Below [`PHOTO_SPIN_THRESHOLD`] the frame faces away from the trunk
    /// with a small wobble; above it, it free-spins at `rotation_speed`.
    pub fn step(&mut self, frame: &FrameInput) {
        self.progress = self.progress.step(frame.dt, frame.state, PHOTO_RATE);
        let p = self.progress.value();
        let translation = self.target.lerp(self.chaos, ease_in_out_cubic(p));

        if p > PHOTO_SPIN_THRESHOLD {
            self.euler += self.rotation_speed * frame.dt.max(0.0);
        } else {
            let t = frame.elapsed;
            let yaw = outward_yaw(translation).unwrap_or(self.euler.y);
            self.euler = Vec3::new(
                (t * 1.2 + self.wobble_offset).cos() * PHOTO_WOBBLE_AMPLITUDE,
                yaw,
                (t * 1.5 + self.wobble_offset).sin() * PHOTO_WOBBLE_AMPLITUDE,
            );
        }

        let scale = 1.0 + (PHOTO_CHAOS_SCALE - 1.0) * p;
        self.transform = Transform::from_euler(translation, self.euler, scale);
    }
}

/// Yaw that turns a +Z-facing plane to look radially away from the Y axis.
/// `None` on the axis itself, where "outward" is undefined.
pub fn outward_yaw(position: Vec3) -> Option<f32> {
    let (x, z) = (position.x, position.z);
    if x * x + z * z < 1e-12 {
        return None;
    }
    // Facing the axis then turning half a revolution.
    let toward_axis = (-x).atan2(-z);
    Some(wrap_angle(toward_axis + PI))
}

#[inline]
fn wrap_angle(a: f32) -> f32 {
    (a + PI).rem_euclid(TAU) - PI
}

/// One photo: its texture handle and motion.
#[derive(Debug)]
pub struct PhotoEntity<T> {
    pub id: PhotoId,
    pub name: String,
    pub texture: T,
    pub motion: PhotoMotion,
}

/// Slot arena of photos. See the module docs for the index policy.
#[derive(Debug)]
pub struct PhotoArena<T> {
    slots: Vec<Option<PhotoEntity<T>>>,
    by_id: FnvHashMap<PhotoId, usize>,
    next_id: u64,
    tree_height: f32,
    radius: f32,
}

impl<T> Default for PhotoArena<T> {
    fn default() -> Self {
        Self::new(TREE_HEIGHT, PHOTO_RADIUS)
    }
}

impl<T> PhotoArena<T> {
    pub fn new(tree_height: f32, radius: f32) -> Self {
        Self {
            slots: Vec::new(),
            by_id: FnvHashMap::default(),
            next_id: 1,
            tree_height,
            radius,
        }
    }

    /// Hang a decoded photo on the tree; returns its id.
    pub fn add<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        name: impl Into<String>,
        texture: T,
    ) -> PhotoId {
        let id = PhotoId(self.next_id);
        self.next_id += 1;
        let entity = PhotoEntity {
            id,
            name: name.into(),
            texture,
            motion: PhotoMotion::generate(rng, self.tree_height, self.radius),
        };
        let slot = match self.slots.iter().position(Option::is_none) {
            Some(free) => {
                self.slots[free] = Some(entity);
                free
            }
            None => {
                self.slots.push(Some(entity));
                self.slots.len() - 1
            }
        };
        self.by_id.insert(id, slot);
        log::info!("[photos] added {id} in slot {slot}");
        id
    }

    /// Add a batch of decode results. Failures are logged and skipped; the
    /// rest are added in order.
    pub fn add_all<R, I>(&mut self, rng: &mut R, results: I) -> Vec<PhotoId>
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = TreeResult<(String, T)>>,
    {
        let mut ids = Vec::new();
        for result in results {
            match result {
                Ok((name, texture)) => ids.push(self.add(rng, name, texture)),
                Err(e) => log::warn!("[photos] skipped: {e}"),
            }
        }
        ids
    }

    /// Remove a photo and release its texture. Other slots are untouched.
    pub fn remove(&mut self, id: PhotoId) -> TreeResult<PhotoEntity<T>> {
        let slot = self.by_id.remove(&id).ok_or(TreeError::UnknownPhoto(id))?;
        let entity = self.slots[slot].take().ok_or(TreeError::UnknownPhoto(id))?;
        // Trailing tombstones carry no render index worth keeping.
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
        log::info!("[photos] removed {id} from slot {slot}");
        Ok(entity)
    }

    /// Release every photo (session teardown).
    pub fn clear(&mut self) {
        let n = self.len();
        self.slots.clear();
        self.by_id.clear();
        if n > 0 {
            log::info!("[photos] released {n} photo(s)");
        }
    }

    pub fn get(&self, id: PhotoId) -> Option<&PhotoEntity<T>> {
        let slot = *self.by_id.get(&id)?;
        self.slots.get(slot)?.as_ref()
    }

    pub fn slot_of(&self, id: PhotoId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    /// Number of live photos.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Number of slots, including empty ones below the highest live slot.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Live photos with their slots, in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &PhotoEntity<T>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, e)| e.as_ref().map(|e| (slot, e)))
    }

    /// Most recently added live photo.
    pub fn newest(&self) -> Option<PhotoId> {
        self.by_id.keys().max().copied()
    }

    pub fn step(&mut self, frame: &FrameInput) {
        for entity in self.slots.iter_mut().flatten() {
            entity.motion.step(frame);
        }
    }

    pub fn write_instances(&self, out: &mut Vec<PhotoInstance>) {
        out.clear();
        for (slot, e) in self.iter() {
            out.push(PhotoInstance {
                slot,
                instance: MeshInstance::new(e.motion.transform().matrix(), [1.0; 4]),
            });
        }
    }
}
