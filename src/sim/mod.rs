//! Deterministic simulation module
//!
//! Everything that has state or depends on time lives here:
//! - Navigation state and the crack-onset latch
//! - Crack/split kinematics of the two halves
//! - The droplet pool (seeded RNG only)
//! - The driver tying them to the host's frame clock
//!
//! All per-frame results are pure functions of (state, time), so none of it
//! needs a renderer to test.

pub mod driver;
pub mod droplets;
pub mod kinematics;
pub mod state;

pub use driver::{SceneSink, Tutorial};
pub use droplets::{Droplet, DropletPool, DropletSystem, DropletTransform, splash_positions};
pub use kinematics::{HalvesTransform, PartPose, compute_halves_transform, shake_offset, split_amount};
pub use state::{CrackLatch, SimulationState};
