//! Coconut Steps - an eight-step interactive 3D tutorial on opening a coconut
//!
//! Core modules:
//! - `steps`: Step registry (titles, descriptions, progress helpers)
//! - `sim`: Deterministic simulation (navigation state, crack kinematics, droplets)
//! - `scene`: Pure step-to-scene composition
//! - `renderer`: Tessellation of scene primitives into GPU-ready vertices
//! - `settings`: User configuration

pub mod error;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod sim;
pub mod steps;

pub use error::{RegistryError, SettingsError, StepError};
pub use scene::{FramePose, SceneDescription, compose, compose_clamped};
pub use settings::{QualityPreset, Settings};
pub use sim::{SceneSink, Tutorial};
pub use steps::{Step, StepDescriptor, StepRegistry};

use glam::{EulerRot, Quat, Vec3};

/// Tutorial configuration constants
pub mod consts {
    /// Number of steps in the tutorial
    pub const STEP_COUNT: u8 = 8;
    /// First step where the coconut is drawn as two halves
    pub const CRACK_STEP: u8 = 7;
    /// Step where the halves separate
    pub const SPLIT_STEP: u8 = 8;

    /// Droplet pool size
    pub const DROPLET_COUNT: usize = 20;
    /// Decorative splash markers shown while splitting
    pub const SPLASH_COUNT: usize = 15;
    /// Small droplets around the pouring stream (step 5)
    pub const STREAM_DROPLET_COUNT: usize = 8;

    /// Gravity for droplets (units/s²)
    pub const GRAVITY: f32 = -4.8;
    /// Multiplier applied to horizontal droplet travel
    pub const AIR_RESISTANCE: f32 = 0.98;
    /// Length of one droplet animation cycle (seconds)
    pub const DROPLET_CYCLE: f32 = 3.0;
    /// Droplets older than this within their cycle are respawned
    pub const DROPLET_LIFETIME: f32 = 2.8;
    /// Ground height; droplets below are respawned
    pub const GROUND_LEVEL: f32 = -2.5;

    /// Droplet spin rates (rad/s) around X and Z
    pub const DROPLET_SPIN_X: f32 = 2.0;
    pub const DROPLET_SPIN_Z: f32 = 1.5;
    /// Droplet scale decay per second and floor
    pub const DROPLET_SHRINK_RATE: f32 = 0.3;
    pub const DROPLET_MIN_SCALE: f32 = 0.3;
    /// Droplet opacity decay per second and floor
    pub const DROPLET_FADE_RATE: f32 = 0.4;
    pub const DROPLET_MIN_OPACITY: f32 = 0.2;

    /// Pre-crack shake frequency (rad/s) and amplitude
    pub const SHAKE_FREQUENCY: f32 = 15.0;
    pub const SHAKE_AMPLITUDE: f32 = 0.03;
    /// Split progress per second and its final value
    pub const SPLIT_RATE: f32 = 0.8;
    pub const SPLIT_MAX: f32 = 2.0;

    /// Idle sway on the first step
    pub const IDLE_SWAY_FREQUENCY: f32 = 0.5;
    pub const IDLE_SWAY_AMPLITUDE: f32 = 0.1;

    /// Pouring stream oscillation (step 5)
    pub const STREAM_FREQUENCY: f32 = 2.0;
    pub const STREAM_BASE_Y: f32 = -1.5;
}

/// Rotation quaternion for XYZ Euler angles (the convention used by every transform in the crate)
#[inline]
pub fn euler_to_quat(rotation: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z)
}

/// Clamp a visual parameter to `[floor, 1]`, mapping NaN to the floor
#[inline]
pub fn clamp_visual(value: f32, floor: f32) -> f32 {
    if value.is_nan() {
        floor
    } else {
        value.clamp(floor, 1.0)
    }
}
