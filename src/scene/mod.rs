//! Declarative scene description
//!
//! `compose` maps a step to the full set of parts (primitive + material +
//! transform, keyed by logical name). The description is regenerated, never
//! patched, whenever the step changes; motion is layered on by `FramePose`.

pub mod compose;
pub mod material;
pub mod part;
pub mod pose;

pub use compose::{compose, compose_clamped, compose_step, eye_position, stream_droplet_position};
pub use material::{Material, Side, colors};
pub use part::{Group, Light, Part, PartId, PartKind, Primitive, Transform};
pub use pose::{FramePose, PosedPart, idle_sway, water_stream_transform};

use serde::{Deserialize, Serialize};

use crate::steps::Step;

/// All parts, lights and the coconut's rest root transform for one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub step: Step,
    /// Rest transform of the coconut group
    pub root: Transform,
    pub parts: Vec<Part>,
    pub lights: Vec<Light>,
}

impl SceneDescription {
    /// Part by logical name and index
    pub fn part(&self, kind: PartKind, index: u8) -> Option<&Part> {
        let id = PartId::new(kind, index);
        self.parts.iter().find(|p| p.id == id)
    }

    pub fn parts_of(&self, kind: PartKind) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(move |p| p.id.kind == kind)
    }

    pub fn count(&self, kind: PartKind) -> usize {
        self.parts_of(kind).count()
    }

    pub fn has(&self, kind: PartKind) -> bool {
        self.parts_of(kind).next().is_some()
    }

    pub fn has_group(&self, group: Group) -> bool {
        self.parts.iter().any(|p| p.group == group)
    }
}
