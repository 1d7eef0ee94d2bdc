pub mod animator;
pub mod clock;
pub mod config;
pub mod constants;
pub mod distribution;
pub mod error;
pub mod foliage;
pub mod gesture;
pub mod instances;
pub mod ornaments;
pub mod photos;
pub mod scene;
pub mod signal;
pub mod star;
pub mod starfield;
pub mod state;

// Shaders bundled as string constants
pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");
pub static PHOTO_WGSL: &str = include_str!("../shaders/photo.wgsl");

pub use animator::*;
pub use clock::*;
pub use config::*;
pub use constants::*;
pub use error::*;
pub use instances::*;
pub use scene::*;
pub use state::*;
