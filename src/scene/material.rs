//! Surface materials and the scene palette

use serde::{Deserialize, Serialize};

/// Palette (linear-ish RGB)
pub mod colors {
    pub const SHELL: [f32; 3] = [0.545, 0.271, 0.075];
    pub const HUSK: [f32; 3] = [0.804, 0.522, 0.247];
    pub const MEAT: [f32; 3] = [1.0, 0.996, 0.941];
    pub const CAVITY: [f32; 3] = [0.961, 0.961, 0.863];
    pub const EYE: [f32; 3] = [0.173, 0.094, 0.063];
    pub const EYE_ACTIVE: [f32; 3] = [1.0, 0.267, 0.267];
    pub const HOLE: [f32; 3] = [0.0, 0.0, 0.0];
    pub const SEAM: [f32; 3] = [1.0, 0.42, 0.42];
    pub const CRACK: [f32; 3] = [0.0, 0.0, 0.0];
    pub const TOOL: [f32; 3] = [0.753, 0.753, 0.753];
    pub const HAMMER_HANDLE: [f32; 3] = [0.545, 0.271, 0.075];
    pub const HAMMER_HEAD: [f32; 3] = [0.333, 0.333, 0.333];
    pub const WATER: [f32; 3] = [0.31, 0.765, 0.969];
    pub const WATER_GLOW: [f32; 3] = [0.529, 0.808, 0.922];
    pub const GLASS: [f32; 3] = [1.0, 1.0, 1.0];
    pub const GLASS_WATER: [f32; 3] = [0.902, 0.969, 1.0];
    pub const PUDDLE: [f32; 3] = [0.69, 0.878, 0.902];
    pub const GROUND: [f32; 3] = [0.961, 0.961, 0.863];
    pub const WARM_LIGHT: [f32; 3] = [1.0, 0.973, 0.863];
}

/// Which faces of a surface are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// Standard PBR-style material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: [f32; 3],
    pub opacity: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub side: Side,
    /// Procedural fibre texture on the shell
    #[serde(default)]
    pub fibrous: bool,
}

impl Material {
    /// Opaque, rough, non-metallic
    pub const fn matte(color: [f32; 3]) -> Self {
        Self {
            color,
            opacity: 1.0,
            roughness: 1.0,
            metalness: 0.0,
            emissive: [0.0; 3],
            emissive_intensity: 0.0,
            side: Side::Front,
            fibrous: false,
        }
    }

    /// Transparent, glossy liquid
    pub const fn water(color: [f32; 3], opacity: f32) -> Self {
        Self {
            color,
            opacity,
            roughness: 0.1,
            metalness: 0.1,
            emissive: [0.0; 3],
            emissive_intensity: 0.0,
            side: Side::Front,
            fibrous: false,
        }
    }

    pub const fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub const fn with_surface(mut self, roughness: f32, metalness: f32) -> Self {
        self.roughness = roughness;
        self.metalness = metalness;
        self
    }

    pub const fn with_glow(mut self, emissive: [f32; 3], intensity: f32) -> Self {
        self.emissive = emissive;
        self.emissive_intensity = intensity;
        self
    }

    pub const fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub const fn fibrous(mut self) -> Self {
        self.fibrous = true;
        self
    }

    /// RGBA with opacity scaled by `fade`
    pub fn rgba(&self, fade: f32) -> [f32; 4] {
        let [r, g, b] = self.color;
        [r, g, b, (self.opacity * fade).clamp(0.0, 1.0)]
    }
}
