//! Scene part types: logical names, primitives and transforms

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use super::material::Material;
use crate::euler_to_quat;

/// Logical part name; together with an index it keys a part within a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PartKind {
    Shell,
    Husk,
    Meat,
    Cavity,
    Eye,
    Hole,
    SeamRing,
    CrackRing,
    CrackShard,
    Tool,
    HammerHandle,
    HammerHead,
    WaterStream,
    StreamDroplet,
    Glass,
    GlassWater,
    Puddle,
    Ripple,
    Droplet,
    SpillStream,
    Splash,
    Ground,
}

impl PartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartKind::Shell => "shell",
            PartKind::Husk => "husk",
            PartKind::Meat => "meat",
            PartKind::Cavity => "cavity",
            PartKind::Eye => "eye",
            PartKind::Hole => "hole",
            PartKind::SeamRing => "seam-ring",
            PartKind::CrackRing => "crack-ring",
            PartKind::CrackShard => "crack-shard",
            PartKind::Tool => "tool",
            PartKind::HammerHandle => "hammer-handle",
            PartKind::HammerHead => "hammer-head",
            PartKind::WaterStream => "water-stream",
            PartKind::StreamDroplet => "stream-droplet",
            PartKind::Glass => "glass",
            PartKind::GlassWater => "glass-water",
            PartKind::Puddle => "puddle",
            PartKind::Ripple => "ripple",
            PartKind::Droplet => "droplet",
            PartKind::SpillStream => "spill-stream",
            PartKind::Splash => "splash",
            PartKind::Ground => "ground",
        }
    }
}

/// Unique key of a part within one scene description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartId {
    pub kind: PartKind,
    pub index: u8,
}

impl PartId {
    pub const fn new(kind: PartKind, index: u8) -> Self {
        Self { kind, index }
    }
}

impl std::fmt::Display for PartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.kind.as_str(), self.index)
    }
}

/// Group whose animated transform a part inherits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    /// Not attached to the coconut (ground, pouring water, puddle)
    World,
    /// The whole coconut (idle sway, step-5 flip)
    Coconut,
    TopHalf,
    BottomHalf,
    /// Driven per-slot by the droplet pool
    Droplets,
}

/// Geometric primitive, dimensions in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Sphere {
        radius: f32,
    },
    /// Sphere restricted to polar angles `[theta_start, theta_start + theta_length]`
    /// measured from +Y; a hemisphere is how the cut halves are drawn
    SphereSegment {
        radius: f32,
        theta_start: f32,
        theta_length: f32,
    },
    /// Cylinder along Y, centered at the origin
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
    },
    /// Torus in the XZ plane (horizontal when unrotated, unlike XY-plane ring conventions)
    Torus {
        radius: f32,
        tube: f32,
    },
    Cuboid {
        size: Vec3,
    },
    /// Flat disc in the XY plane facing +Z
    Disc {
        radius: f32,
    },
    /// Flat ring in the XY plane facing +Z
    Annulus {
        inner: f32,
        outer: f32,
    },
    /// Rectangle in the XY plane facing +Z
    Plane {
        width: f32,
        height: f32,
    },
}

/// Translation, XYZ Euler rotation and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scaled(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, euler_to_quat(self.rotation), self.position)
    }
}

/// One renderable part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: PartId,
    pub group: Group,
    pub primitive: Primitive,
    pub material: Material,
    /// Local transform within `group`
    pub transform: Transform,
}

/// Light in the scene rig
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Light {
    Ambient {
        intensity: f32,
    },
    Directional {
        position: Vec3,
        intensity: f32,
    },
    Point {
        position: Vec3,
        intensity: f32,
        color: [f32; 3],
    },
    Spot {
        position: Vec3,
        intensity: f32,
        angle: f32,
        penumbra: f32,
    },
}
