use glam::Vec3;

// Shared tuning constants used by both web and native frontends.

// Tree shape
pub const TREE_HEIGHT: f32 = 14.0;
pub const FOLIAGE_RADIUS: f32 = 6.0;
pub const ORNAMENT_RADIUS: f32 = 6.2; // just outside the foliage
pub const PHOTO_RADIUS: f32 = 6.5; // outside the ornaments
pub const CONE_JITTER: f32 = 0.5; // full span of radius/height noise on the spiral

// Scattered cloud
pub const FOLIAGE_CHAOS_RADIUS: f32 = 18.0;
pub const ORNAMENT_CHAOS_RADIUS: f32 = 25.0;
pub const PHOTO_CHAOS_RADIUS: f32 = 25.0;
pub const STAR_CHAOS_RADIUS: f32 = 20.0;
pub const CHAOS_LIFT: f32 = 6.0; // cloud centre sits above the tree centre
pub const STAR_CHAOS_LIFT: f32 = 8.0;

// Population
pub const FOLIAGE_COUNT: usize = 20_000;
pub const ORNAMENT_COUNT: usize = 350;

// Progress rate constants (1/s)
pub const FOLIAGE_RATE: f32 = 2.0;
pub const STAR_RATE: f32 = 2.0;
pub const PHOTO_RATE: f32 = 2.0;
pub const ORNAMENT_RATE: f32 = 1.5; // lags the particle layer

// Particle embellishment
pub const SHIMMER_AMPLITUDE: f32 = 0.2;
pub const SHIMMER_FREQUENCY: f32 = 5.0;
pub const SHIMMER_PHASE_SPREAD: f32 = 10.0;

// Ornament embellishment
pub const ORNAMENT_PHASE_VARIANCE: f32 = 0.1;
pub const ORNAMENT_SPIN_BOOST: f32 = 10.0;

// Photo embellishment
pub const PHOTO_SPIN_THRESHOLD: f32 = 0.05;
pub const PHOTO_SPIN_SPEED_MAX: f32 = 1.5;
pub const PHOTO_WOBBLE_AMPLITUDE: f32 = 0.05;
pub const PHOTO_CHAOS_SCALE: f32 = 0.6;

// Star
pub const STAR_FORMED_POSITION: Vec3 = Vec3::new(0.0, 7.8, 0.0);
pub const STAR_SPIN_SPEED: f32 = 0.8;
pub const STAR_TILT_THRESHOLD: f32 = 0.01;
pub const STAR_TILT_DAMPING: f32 = 5.0;
pub const STAR_PULSE_AMPLITUDE: f32 = 0.1;
pub const STAR_PULSE_FREQUENCY: f32 = 2.0;

// Gesture heuristics
pub const GESTURE_OPEN_THRESHOLD: f32 = 0.25; // normalized image units
pub const GESTURE_WINDOW: usize = 10;
pub const GESTURE_WINDOW_MAX: usize = 1024; // about 30 s of inference frames

// Background star shell
pub const STARFIELD_COUNT: usize = 3_000;
pub const STARFIELD_RADIUS: f32 = 50.0; // inner edge of the shell
pub const STARFIELD_DEPTH: f32 = 50.0; // shell thickness
pub const STARFIELD_FACTOR: f32 = 4.0; // largest star size multiplier
pub const STARFIELD_SPEED: f32 = 1.0; // twinkle rate
pub const STARFIELD_SPRITE_SCALE: f32 = 0.08; // world units per size unit
pub const STARFIELD_LIGHTNESS: f32 = 0.9; // unsaturated, so grey-white

// Scene root
pub const SCENE_OFFSET: Vec3 = Vec3::new(0.0, -1.0, 0.0);

// Palettes
pub const ORNAMENT_PALETTE: [[f32; 3]; 4] = [
    [1.0, 0.843, 0.0],     // gold
    [0.698, 0.133, 0.133], // firebrick
    [0.941, 0.973, 1.0],   // alice blue
    [0.831, 0.686, 0.216], // metallic gold
];
pub const FOLIAGE_DEEP: [f32; 3] = [0.0, 0.2, 0.067];
pub const FOLIAGE_LIGHT: [f32; 3] = [0.059, 0.349, 0.208];
pub const GOLD: [f32; 3] = [0.965, 0.878, 0.427];
pub const STAR_GOLD: [f32; 3] = [1.0, 0.843, 0.0];
pub const BACKGROUND: [f32; 3] = [0.0, 0.047, 0.02];
