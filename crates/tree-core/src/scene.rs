//! Scene composition: every animated layer under one root.
//!
//! Typical usage per frame:
//! - read the transition signal once
//! - `clock.tick()` then `scene.update(&clock.frame(state))`
//! - `scene.write_instances(&mut buffers)` and hand the buffers to the renderer

use crate::animator::Hover;
use crate::config::{SceneParams, TreeConfig};
use crate::constants::*;
use crate::error::TreeResult;
use crate::foliage::ParticleSet;
use crate::instances::SceneInstances;
use crate::ornaments::OrnamentBatch;
use crate::photos::{PhotoArena, PhotoEntity, PhotoId};
use crate::star::StarAnimator;
use crate::starfield::Starfield;
use crate::state::{FrameInput, SceneSetup};
use glam::Mat4;
use rand::prelude::*;

/// All animated entities plus the inert render setup.
///
/// `T` is the frontend's texture handle for photos.
pub struct Scene<T> {
    pub setup: SceneSetup,
    pub hover: Hover,
    foliage: ParticleSet,
    ornaments: OrnamentBatch,
    star: StarAnimator,
    photos: PhotoArena<T>,
    starfield: Starfield,
    rng: StdRng,
    last_frame: FrameInput,
}

impl<T> Scene<T> {
    /// Generate every layout from `seed`. The same seed and params always
    /// produce the same scene.
    pub fn new(params: &SceneParams, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let foliage = ParticleSet::generate(&mut rng, params);
        let ornaments = OrnamentBatch::generate(&mut rng, params);
        let star = StarAnimator::generate(&mut rng);
        let starfield = Starfield::generate(
            &mut rng,
            params.star_count,
            STARFIELD_RADIUS,
            STARFIELD_DEPTH,
            STARFIELD_FACTOR,
        );
        log::info!(
            "[scene] generated particles={} ornaments={} stars={} seed={}",
            foliage.len(),
            ornaments.len(),
            starfield.len(),
            seed
        );
        Self {
            setup: SceneSetup::default(),
            hover: Hover::default(),
            foliage,
            ornaments,
            star,
            photos: PhotoArena::new(params.tree_height, params.photo_radius),
            starfield,
            rng,
            last_frame: FrameInput::default(),
        }
    }

    pub fn from_config(config: &TreeConfig) -> Self {
        Self::new(&config.scene, config.seed)
    }

    pub fn foliage(&self) -> &ParticleSet {
        &self.foliage
    }

    pub fn ornaments(&self) -> &OrnamentBatch {
        &self.ornaments
    }

    pub fn star(&self) -> &StarAnimator {
        &self.star
    }

    pub fn photos(&self) -> &PhotoArena<T> {
        &self.photos
    }

    pub fn starfield(&self) -> &Starfield {
        &self.starfield
    }

    pub fn last_frame(&self) -> FrameInput {
        self.last_frame
    }

    /// Step every animator with the same snapshot.
    pub fn update(&mut self, frame: &FrameInput) {
        self.foliage.step(frame);
        self.ornaments.step(frame);
        self.star.step(frame);
        self.photos.step(frame);
        self.starfield.step(frame);
        self.last_frame = *frame;
    }

    pub fn add_photo(&mut self, name: impl Into<String>, texture: T) -> PhotoId {
        self.photos.add(&mut self.rng, name, texture)
    }

    pub fn add_photos<I>(&mut self, results: I) -> Vec<PhotoId>
    where
        I: IntoIterator<Item = TreeResult<(String, T)>>,
    {
        self.photos.add_all(&mut self.rng, results)
    }

    pub fn remove_photo(&mut self, id: PhotoId) -> TreeResult<PhotoEntity<T>> {
        self.photos.remove(id)
    }

    /// Release every photo texture.
    pub fn teardown(&mut self) {
        self.photos.clear();
    }

    /// Offset and hover applied above every layer.
    pub fn root_matrix(&self) -> Mat4 {
        let hover = self.hover.transform(self.last_frame.elapsed);
        Mat4::from_translation(SCENE_OFFSET) * hover.matrix()
    }

    /// Refill `out` with render-ready instances for the last update.
    pub fn write_instances(&self, out: &mut SceneInstances) {
        self.foliage.write_instances(&mut out.particles);
        self.ornaments.write_instances(&mut out.ornaments);
        out.star = self.star.instance();
        self.photos.write_instances(&mut out.photos);
        self.starfield.write_instances(&mut out.backdrop);
        out.root = self.root_matrix().to_cols_array_2d();
    }
}
